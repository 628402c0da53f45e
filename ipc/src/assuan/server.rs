//! The server side of the protocol.
//!
//! A [`Server`] owns a static command table and drives one accepted
//! connection at a time: greeting, command dispatch, and the
//! response stream.  Command handlers receive a [`Connection`]
//! through which they emit data and status lines and perform
//! inquiries.
//!
//! The loop is strictly single-threaded.  An [`inquiry`] blocks the
//! handler until the peer answers; no new command is read while one
//! is outstanding, so responses are emitted strictly in command
//! order.
//!
//!   [`inquiry`]: Connection::inquire

use std::io::{BufRead, Write};

use crate::Error;
use crate::Result;
use crate::assuan::{MAX_LINE_LENGTH, escape_data, unescape_data};

/// A handler for one protocol command.
///
/// The arguments are the connection, the per-session state, and the
/// argument string with the command name already stripped.
pub type Handler<S> = fn(&mut Connection, &mut S, &str) -> Result<()>;

/// An entry of the server's command table.
pub struct Command<S> {
    /// The command name, upper-case ASCII.
    pub name: &'static str,
    /// The help text emitted by `HELP <name>`.
    pub help: &'static str,
    /// The handler.
    pub run: Handler<S>,
}

/// Maps an error to the `(code, description)` pair put on an `ERR`
/// line.
pub type ErrorMapper = fn(&anyhow::Error) -> (u32, String);

fn default_error_mapper(err: &anyhow::Error) -> (u32, String) {
    (1, err.to_string())
}

/// One accepted connection.
///
/// This is the handle command handlers use to talk to the peer.
pub struct Connection<'a> {
    reader: &'a mut dyn BufRead,
    writer: &'a mut dyn Write,
    close_requested: bool,
}

impl<'a> Connection<'a> {
    fn new(reader: &'a mut dyn BufRead, writer: &'a mut dyn Write) -> Self {
        Connection {
            reader,
            writer,
            close_requested: false,
        }
    }

    /// Reads one line, not including the terminator.
    ///
    /// Returns `None` on a clean EOF.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let n = self.reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.len() > MAX_LINE_LENGTH {
            return Err(Error::LineTooLong(line.len()).into());
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn ok(&mut self, message: Option<&str>) -> Result<()> {
        match message {
            Some(m) => self.write_line(&format!("OK {}", m)),
            None => self.write_line("OK"),
        }
    }

    fn err(&mut self, code: u32, description: &str) -> Result<()> {
        self.write_line(&format!("ERR {} {}", code, description))
    }

    /// Sends raw data to the client as a sequence of `D` lines.
    pub fn data(&mut self, data: &[u8]) -> Result<()> {
        // Chunk the raw data so that even fully escaped chunks stay
        // within the line limit.
        for chunk in data.chunks(256) {
            self.writer.write_all(b"D ")?;
            self.writer.write_all(&escape_data(chunk))?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Sends an `END` line, separating multiple data items within
    /// one response.
    pub fn end(&mut self) -> Result<()> {
        self.write_line("END")
    }

    /// Sends a status line to the client.
    pub fn status(&mut self, keyword: &str, message: &str) -> Result<()> {
        self.write_line(&format!("S {} {}", keyword, message))
    }

    /// Sends help text to the client as `#` comment lines.
    pub fn help_text(&mut self, text: &str) -> Result<()> {
        for line in text.lines() {
            self.write_line(&format!("# {}", line))?;
        }
        Ok(())
    }

    /// Asks the client for data.
    ///
    /// Emits an `INQUIRE` line and synchronously reads the client's
    /// `D`/`END` reply.  The returned buffer may be empty if the
    /// client had nothing to send.  If the accumulated data would
    /// exceed `max_len`, the inquiry fails with
    /// [`Error::InquiryTooLarge`]; the data is never silently
    /// truncated.  A `CAN` line from the client fails the inquiry
    /// with [`Error::Cancelled`].
    ///
    /// While the inquiry is outstanding, no command line is
    /// processed; the peer must not pipeline commands across an
    /// inquiry.
    pub fn inquire(&mut self, keyword: &str, parameters: Option<&str>,
                   max_len: usize)
                   -> Result<Vec<u8>> {
        match parameters {
            Some(p) => self.write_line(&format!("INQUIRE {} {}", keyword, p))?,
            None => self.write_line(&format!("INQUIRE {}", keyword))?,
        }
        self.writer.flush()?;

        let mut data = Vec::new();
        loop {
            let line = self.read_line()?
                .ok_or(Error::ConnectionClosed)?;

            if let Some(rest) = line.strip_prefix(b"D ") {
                data.extend_from_slice(&unescape_data(rest)?);
                if data.len() > max_len {
                    return Err(Error::InquiryTooLarge(max_len).into());
                }
            } else if line == b"D" {
                // An empty data line; nothing to add.
            } else if line == b"END" {
                return Ok(data);
            } else if line == b"CAN" {
                return Err(Error::Cancelled.into());
            } else {
                return Err(Error::UnexpectedResponse(
                    String::from_utf8_lossy(&line).into()).into());
            }
        }
    }

    /// Requests that the connection is closed after the current
    /// command completes.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }
}

/// A protocol server.
///
/// The server is parameterized over the per-session state `S`; a
/// fresh state is allocated by the caller for every connection and
/// handed to [`Server::serve`].
pub struct Server<S: 'static> {
    commands: &'static [Command<S>],
    greeting: String,
    option_handler: Option<fn(&mut S, &str, &str) -> Result<()>>,
    reset_handler: Option<fn(&mut S)>,
    error_mapper: ErrorMapper,
}

impl<S> Server<S> {
    /// Creates a server with the given command table and greeting.
    pub fn new(commands: &'static [Command<S>], greeting: String) -> Self {
        Server {
            commands,
            greeting,
            option_handler: None,
            reset_handler: None,
            error_mapper: default_error_mapper,
        }
    }

    /// Installs a handler for `OPTION` lines.
    pub fn with_option_handler(
        mut self, h: fn(&mut S, &str, &str) -> Result<()>) -> Self {
        self.option_handler = Some(h);
        self
    }

    /// Installs a handler for `RESET` lines.
    pub fn with_reset_handler(mut self, h: fn(&mut S)) -> Self {
        self.reset_handler = Some(h);
        self
    }

    /// Installs the error-to-wire-code mapping.
    pub fn with_error_mapper(mut self, m: ErrorMapper) -> Self {
        self.error_mapper = m;
        self
    }

    fn lookup(&self, name: &str) -> Option<&Command<S>> {
        self.commands.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Serves one connection until EOF or `BYE`.
    pub fn serve(&self, reader: &mut dyn BufRead, writer: &mut dyn Write,
                 state: &mut S)
                 -> Result<()> {
        let mut conn = Connection::new(reader, writer);
        conn.ok(Some(&self.greeting))?;
        conn.writer.flush()?;

        loop {
            let line = match conn.read_line()? {
                Some(l) => l,
                None => break,
            };

            if line.is_empty() || line[0] == b'#' {
                continue;
            }

            let line = match String::from_utf8(line) {
                Ok(l) => l,
                Err(e) => {
                    let err = anyhow::Error::from(Error::MalformedLine(
                        String::from_utf8_lossy(e.as_bytes()).into()));
                    self.report(&mut conn, &err)?;
                    continue;
                },
            };

            let (cmd, args) = match line.find(' ') {
                Some(i) => (&line[..i], line[i + 1..].trim_start()),
                None => (&line[..], ""),
            };

            let result = if cmd.eq_ignore_ascii_case("BYE") {
                conn.ok(Some("closing connection"))?;
                conn.writer.flush()?;
                break;
            } else if cmd.eq_ignore_ascii_case("NOP") {
                Ok(())
            } else if cmd.eq_ignore_ascii_case("RESET") {
                if let Some(h) = self.reset_handler {
                    h(state);
                }
                Ok(())
            } else if cmd.eq_ignore_ascii_case("OPTION") {
                self.handle_option(state, args)
            } else if cmd.eq_ignore_ascii_case("HELP") {
                self.handle_help(&mut conn, args)
            } else if let Some(command) = self.lookup(cmd) {
                (command.run)(&mut conn, state, args)
            } else {
                Err(Error::UnknownCommand(cmd.into()).into())
            };

            match result {
                Ok(()) => conn.ok(None)?,
                Err(err) => {
                    log::error!("command {:?} failed: {}", cmd, err);
                    self.report(&mut conn, &err)?;
                },
            }
            conn.writer.flush()?;

            if conn.close_requested {
                break;
            }
        }

        Ok(())
    }

    fn report(&self, conn: &mut Connection, err: &anyhow::Error)
              -> Result<()> {
        let (code, description) = (self.error_mapper)(err);
        conn.err(code, &description)?;
        conn.writer.flush()?;
        Ok(())
    }

    fn handle_option(&self, state: &mut S, args: &str) -> Result<()> {
        let handler = self.option_handler
            .ok_or_else(|| Error::UnknownOption(args.into()))?;

        // OPTION name[=value] or OPTION name value.
        let args = args.trim();
        let (key, value) = if let Some(i) = args.find('=') {
            (&args[..i], args[i + 1..].trim())
        } else if let Some(i) = args.find(' ') {
            (&args[..i], args[i + 1..].trim())
        } else {
            (args, "")
        };

        handler(state, key.trim(), value)
    }

    fn handle_help(&self, conn: &mut Connection, args: &str) -> Result<()> {
        let args = args.trim();
        if args.is_empty() {
            for command in self.commands {
                conn.help_text(command.name)?;
            }
            Ok(())
        } else if let Some(command) = self.lookup(args) {
            conn.help_text(command.help)
        } else {
            Err(Error::UnknownCommand(args.into()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    struct State {
        puts: Vec<String>,
        force: bool,
    }

    const COMMANDS: &[Command<State>] = &[
        Command {
            name: "PUT",
            help: "PUT <value>\n\nStore a value.",
            run: |_conn, state, args| {
                state.puts.push(args.into());
                Ok(())
            },
        },
        Command {
            name: "ASK",
            help: "ASK\n\nInquire a value from the client.",
            run: |conn, state, _args| {
                let data = conn.inquire("VALUE", None, 16)?;
                state.puts.push(String::from_utf8_lossy(&data).into());
                Ok(())
            },
        },
        Command {
            name: "SHOW",
            help: "SHOW\n\nReturn the stored values.",
            run: |conn, state, _args| {
                let blob = state.puts.join(",");
                conn.data(blob.as_bytes())?;
                Ok(())
            },
        },
    ];

    fn run(input: &str, state: &mut State) -> String {
        let mut reader = BufReader::new(input.as_bytes());
        let mut output = Vec::new();
        let server = Server::new(COMMANDS, "test server".into())
            .with_option_handler(|state, key, value| {
                match key {
                    "force" => {
                        state.force = !value.is_empty() && value != "0";
                        Ok(())
                    },
                    _ => Err(Error::UnknownOption(key.into()).into()),
                }
            })
            .with_reset_handler(|state| state.puts.clear());
        server.serve(&mut reader, &mut output, state).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn fresh() -> State {
        State { puts: Vec::new(), force: false }
    }

    #[test]
    fn greeting_and_dispatch() {
        let mut state = fresh();
        let out = run("PUT a\nput b\nBYE\n", &mut state);
        assert!(out.starts_with("OK test server\n"));
        assert_eq!(state.puts, vec!["a", "b"]);
        assert!(out.ends_with("OK closing connection\n"));
    }

    #[test]
    fn unknown_command() {
        let mut state = fresh();
        let out = run("FROB\n", &mut state);
        assert!(out.contains("ERR 1 Unknown command: FROB\n"), "{}", out);
    }

    #[test]
    fn inquiry() {
        let mut state = fresh();
        let out = run("ASK\nD hello%0A\nEND\nSHOW\nBYE\n", &mut state);
        assert!(out.contains("INQUIRE VALUE\n"));
        assert_eq!(state.puts, vec!["hello\n"]);
        assert!(out.contains("D hello%0A\n"));
    }

    #[test]
    fn inquiry_cancel() {
        let mut state = fresh();
        let out = run("ASK\nCAN\n", &mut state);
        assert!(out.contains("ERR"));
        assert!(state.puts.is_empty());
    }

    #[test]
    fn inquiry_bounded() {
        let mut state = fresh();
        // 20 octets exceed the handler's limit of 16.
        let out = run("ASK\nD 01234567890123456789\nEND\n", &mut state);
        assert!(out.contains("ERR"));
        assert!(state.puts.is_empty());
    }

    #[test]
    fn command_after_inquiry_runs_normally() {
        let mut state = fresh();
        let out = run("ASK\nD x\nEND\nPUT y\nBYE\n", &mut state);
        assert_eq!(state.puts, vec!["x", "y"]);
        assert_eq!(out.lines().filter(|l| *l == "OK").count(), 2);
    }

    #[test]
    fn options_and_reset() {
        let mut state = fresh();
        let out = run("OPTION force=1\nPUT a\nRESET\nBYE\n", &mut state);
        assert!(state.force);
        assert!(state.puts.is_empty());
        assert!(!out.contains("ERR"));

        let out = run("OPTION no-such-option 1\n", &mut state);
        assert!(out.contains("ERR"));
    }

    #[test]
    fn help() {
        let mut state = fresh();
        let out = run("HELP ASK\nBYE\n", &mut state);
        assert!(out.contains("# ASK\n"));
    }

    #[test]
    fn line_limit() {
        let mut state = fresh();
        let long = format!("PUT {}\n", "x".repeat(2000));
        let mut reader = BufReader::new(long.as_bytes());
        let mut output = Vec::new();
        let server = Server::new(COMMANDS, "test server".into());
        // An overlong line is a protocol error and tears down the
        // connection.
        assert!(server.serve(&mut reader, &mut output, &mut state).is_err());
    }
}
