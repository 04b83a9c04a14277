//! nRF905 command transport
//!
//! Frames instructions onto the SPI bus. Every command is a single full-duplex
//! transfer of `payload + 1` bytes: the instruction byte followed by the payload on
//! MOSI, the status register followed by the returned data on MISO.
//!
//! The two scratch buffers are owned by the [`Transport`], so a transport (and the
//! [`Nrf905`](crate::Nrf905) that owns it) must not be shared between threads of
//! control without external serialization.
//!
//! # Example
//! ```ignore
//! use nrf905::{commands::ReadInstruction, Transport};
//!
//! let mut transport = Transport::new(spi);
//! let mut address = [0u8; 4];
//! let status = transport.read_command(ReadInstruction::TxAddress, &mut address)?;
//! ```

use embedded_hal::spi::SpiDevice;
use embedded_hal_async::spi::SpiDevice as AsyncSpiDevice;

use crate::commands::{ReadInstruction, Status, WriteInstruction};
use crate::error::{bus_error, Error, ValidationError};

/// Largest payload of a single transaction
pub const MAX_PAYLOAD: usize = 32;

const FRAME_LEN: usize = MAX_PAYLOAD + 1;
const FILLER: u8 = 0xFF;

/// SPI mode expected by the chip
pub const SPI_MODE: embedded_hal::spi::Mode = embedded_hal::spi::MODE_0;

/// Highest SPI clock the chip accepts
pub const MAX_SPI_CLOCK_HZ: u32 = 10_000_000;

/// Instruction framing over an SPI device
pub struct Transport<SPI> {
    spi: SPI,
    tx: [u8; FRAME_LEN],
    rx: [u8; FRAME_LEN],
}

impl<SPI> Transport<SPI> {
    /// Wraps an SPI device configured for [`SPI_MODE`] and at most [`MAX_SPI_CLOCK_HZ`].
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            tx: [0; FRAME_LEN],
            rx: [0; FRAME_LEN],
        }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    fn stage_write(&mut self, opcode: u8, payload: &[u8]) -> Result<usize, Error> {
        if payload.len() > MAX_PAYLOAD {
            return Err(ValidationError::PayloadLength(payload.len()).into());
        }
        let end = payload.len() + 1;
        self.tx[0] = opcode;
        self.tx[1..end].copy_from_slice(payload);
        Ok(end)
    }

    fn stage_read(&mut self, opcode: u8, len: usize) -> Result<usize, Error> {
        if len > MAX_PAYLOAD {
            return Err(ValidationError::PayloadLength(len).into());
        }
        let end = len + 1;
        self.tx[0] = opcode;
        self.tx[1..end].fill(FILLER);
        Ok(end)
    }

    fn unstage(&self, end: usize, payload: &mut [u8]) -> Status {
        payload.copy_from_slice(&self.rx[1..end]);
        Status::from(self.rx[0])
    }
}

impl<SPI> Transport<SPI>
where
    SPI: SpiDevice,
{
    /// Sends `instruction` followed by `payload`.
    ///
    /// # Errors
    /// * `Error::Validation` - payload longer than 32 bytes, nothing was sent
    /// * `Error::Transport` - SPI communication failed
    pub fn write_command(
        &mut self,
        instruction: WriteInstruction,
        payload: &[u8],
    ) -> Result<Status, Error> {
        let end = self.stage_write(instruction.opcode(), payload)?;
        self.exchange(end)?;
        Ok(Status::from(self.rx[0]))
    }

    /// Sends `instruction` and fills `payload` with the bytes the chip returns.
    ///
    /// # Errors
    /// * `Error::Validation` - payload longer than 32 bytes, nothing was sent
    /// * `Error::Transport` - SPI communication failed
    pub fn read_command(
        &mut self,
        instruction: ReadInstruction,
        payload: &mut [u8],
    ) -> Result<Status, Error> {
        let end = self.stage_read(instruction.opcode(), payload.len())?;
        self.exchange(end)?;
        Ok(self.unstage(end, payload))
    }

    /// Reads the status register on its own.
    pub fn read_status(&mut self) -> Result<Status, Error> {
        self.read_command(ReadInstruction::Status, &mut [])
    }

    fn exchange(&mut self, end: usize) -> Result<(), Error> {
        self.spi
            .transfer(&mut self.rx[..end], &self.tx[..end])
            .map_err(bus_error)
    }
}

impl<SPI> Transport<SPI>
where
    SPI: AsyncSpiDevice,
{
    /// Asynchronously sends `instruction` followed by `payload`.
    ///
    /// This is the async version of [`write_command`](Transport::write_command).
    pub async fn write_command_async(
        &mut self,
        instruction: WriteInstruction,
        payload: &[u8],
    ) -> Result<Status, Error> {
        let end = self.stage_write(instruction.opcode(), payload)?;
        self.exchange_async(end).await?;
        Ok(Status::from(self.rx[0]))
    }

    /// Asynchronously sends `instruction` and fills `payload` with the returned bytes.
    ///
    /// This is the async version of [`read_command`](Transport::read_command).
    pub async fn read_command_async(
        &mut self,
        instruction: ReadInstruction,
        payload: &mut [u8],
    ) -> Result<Status, Error> {
        let end = self.stage_read(instruction.opcode(), payload.len())?;
        self.exchange_async(end).await?;
        Ok(self.unstage(end, payload))
    }

    /// Asynchronously reads the status register on its own.
    pub async fn read_status_async(&mut self) -> Result<Status, Error> {
        self.read_command_async(ReadInstruction::Status, &mut [])
            .await
    }

    async fn exchange_async(&mut self, end: usize) -> Result<(), Error> {
        self.spi
            .transfer(&mut self.rx[..end], &self.tx[..end])
            .await
            .map_err(bus_error)
    }
}
