/// A sink for raw diagnostic bytes.
///
/// Transmitters take `&self` so a single instance can sit behind a `static`
/// logger. Output is best-effort: there is no error path.
pub trait Transmitter {
    fn transmit(&self, bytes: &[u8]);
}

impl<T: Transmitter + ?Sized> Transmitter for &T {
    fn transmit(&self, bytes: &[u8]) {
        (**self).transmit(bytes);
    }
}
