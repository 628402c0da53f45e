/// Compile-time assertion that a type is Send and Sync.
///
/// All value types in this crate are plain data and must stay usable
/// across threads.
macro_rules! assert_send_and_sync {
    ( $t:ty ) => {
        const _: () = {
            trait Assert: Send + Sync {}
            impl Assert for $t {}
        };
    };
}
