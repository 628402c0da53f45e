//! The client side of the protocol.
//!
//! The client is deliberately simple; it exists for tests, examples,
//! and small tools that drive a server over a pipe or socket pair.

use std::io::{BufRead, Write};

use crate::Error;
use crate::Result;
use crate::assuan::{MAX_LINE_LENGTH, Response, escape_data};

/// A connection to a server.
pub struct Client<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Client<R, W> {
    /// Creates a client over the given transport and consumes the
    /// server's greeting.
    pub fn connect(reader: R, writer: W) -> Result<(Self, Response)> {
        let mut client = Client { reader, writer };
        let greeting = client.next_response()?
            .ok_or(Error::ConnectionClosed)?;
        Ok((client, greeting))
    }

    /// Sends a command line to the server.
    pub fn send<C: AsRef<str>>(&mut self, command: C) -> Result<()> {
        let command = command.as_ref();
        if command.len() + 1 > MAX_LINE_LENGTH {
            return Err(Error::LineTooLong(command.len() + 1).into());
        }
        writeln!(self.writer, "{}", command)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reads the next response line.
    ///
    /// Returns `None` on a clean EOF.
    pub fn next_response(&mut self) -> Result<Option<Response>> {
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
        Response::parse(&line).map(Some)
    }

    /// Reads responses until the command completes, returning the
    /// collected data and status lines together with the final `OK`
    /// or `ERR`.
    ///
    /// If the server issues an inquiry, this returns early with the
    /// [`Response::Inquire`]; answer it with [`Client::data_reply`]
    /// or [`Client::cancel`] and call a read function again.
    pub fn complete(&mut self)
                    -> Result<(Vec<u8>, Vec<(String, String)>, Response)> {
        let mut data = Vec::new();
        let mut statuses = Vec::new();
        loop {
            let response = self.next_response()?
                .ok_or(Error::ConnectionClosed)?;
            match response {
                Response::Data { mut partial } =>
                    data.append(&mut partial),
                Response::Status { keyword, message } =>
                    statuses.push((keyword, message)),
                Response::Comment { .. } | Response::End => (),
                r @ Response::Ok { .. }
                | r @ Response::Error { .. }
                | r @ Response::Inquire { .. } =>
                    return Ok((data, statuses, r)),
            }
        }
    }

    /// Answers an inquiry with the given data.
    pub fn data_reply(&mut self, data: &[u8]) -> Result<()> {
        for chunk in data.chunks(256) {
            self.writer.write_all(b"D ")?;
            self.writer.write_all(&escape_data(chunk))?;
            self.writer.write_all(b"\n")?;
        }
        writeln!(self.writer, "END")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Cancels an inquiry.
    pub fn cancel(&mut self) -> Result<()> {
        writeln!(self.writer, "CAN")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn greeting_and_data() {
        let input = b"OK hello\nS KEYSERVER hkp://x\nD foo%25\nOK done\n";
        let (mut client, greeting) =
            Client::connect(BufReader::new(&input[..]), Vec::new()).unwrap();
        assert_eq!(greeting, Response::Ok { message: Some("hello".into()) });

        client.send("KEYSERVER").unwrap();
        let (data, statuses, end) = client.complete().unwrap();
        assert_eq!(data, b"foo%");
        assert_eq!(statuses,
                   vec![("KEYSERVER".to_string(), "hkp://x".to_string())]);
        assert_eq!(end, Response::Ok { message: Some("done".into()) });
    }
}
