//! Transport layer for I/O abstraction
//!
//! Both the button/command serial line and the SLCAN CAN adapter sit on top of
//! [`Transport`], so either can run against [`MockTransport`] in tests.

use crate::error::{Error, Result};

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Transport trait for device communication
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read
    ///
    /// A read timeout is not an error and returns `Ok(0)`.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Write the whole buffer, retrying partial writes
    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            if n == 0 {
                return Err(Error::Io(std::io::Error::from(
                    std::io::ErrorKind::WriteZero,
                )));
            }
            data = &data[n..];
        }
        Ok(())
    }

    /// Check if data is available to read
    fn available(&mut self) -> Result<usize> {
        Ok(0) // Default implementation
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        (**self).read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }
}
