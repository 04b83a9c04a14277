//! nRF905 Radio Device Interface
//!
//! [`Nrf905`] binds the SPI transport, the three mode control lines, the status lines and a
//! delay source into one driver. It owns the operating mode and gates every transmit and
//! receive call on it.
//!
//! Register traffic is also available asynchronously when the bus implements
//! `embedded_hal_async::spi::SpiDevice`. Mode control and waiting for data ready always block.
//!
//! # Example
//! ```ignore
//! use core::time::Duration;
//! use nrf905::{Config, ControlPins, Nrf905, StatusLines};
//!
//! let config = Config::default().with_rx_address(&[0x93, 0x9a, 0x0c])?;
//! let pins = ControlPins { chip_enable, power_up, tx_enable };
//! let mut radio = Nrf905::new(spi, pins, StatusLines::polled(), delay, &config)?;
//!
//! radio.standby()?;
//! let mut packet = [0u8; 32];
//! radio.receive(Duration::from_secs(1), &mut packet)?;
//! ```

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use embedded_hal_async::spi::SpiDevice as AsyncSpiDevice;
use regiface::FromByteArray;

use crate::commands::{ReadInstruction, Status, WriteInstruction};
use crate::config::Config;
use crate::error::{Error, ValidationError};
use crate::lines::{CarrierSignal, DataReadySignal, StatusLines, StatusSignal};
use crate::mode::{ControlPins, ModeControl, OperatingMode};
use crate::registers::{AddressWidth, Channel, OutputPower, RfConfig, RF_CONFIG_LEN};
use crate::transport::{Transport, MAX_PAYLOAD};

/// Outcome of reading the configuration register back after a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verification {
    /// The chip holds exactly the written image
    Match,
    /// The chip returned something else
    Mismatch {
        /// Image that was written
        written: [u8; RF_CONFIG_LEN],
        /// Image the chip returned
        read_back: [u8; RF_CONFIG_LEN],
    },
}

impl Verification {
    fn compare(written: [u8; RF_CONFIG_LEN], read_back: [u8; RF_CONFIG_LEN]) -> Self {
        if written == read_back {
            return Self::Match;
        }
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "RF config mismatch, wrote {=[u8]:02x} read {=[u8]:02x}",
            &written[..],
            &read_back[..]
        );
        Self::Mismatch { written, read_back }
    }

    /// Whether the read back image matched
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// nRF905 driver.
///
/// # Type Parameters
/// * `SPI` - SPI device, mode 0 at up to 10 MHz
/// * `CE`, `PWR`, `TXEN` - TRX_CE, PWR_UP and TX_EN output lines
/// * `AM`, `DR`, `CD` - address match, data ready and carrier detect sources, see [`StatusLines`]
/// * `D` - delay source for the power-up settle time, the TRX_CE pulse and polling
///
/// The driver holds the transaction buffers and the current mode, so it must not be used
/// from several threads of control without external serialization.
pub struct Nrf905<SPI, CE, PWR, TXEN, AM, DR, CD, D> {
    transport: Transport<SPI>,
    modes: ModeControl<CE, PWR, TXEN>,
    lines: StatusLines<AM, DR, CD>,
    delay: D,
    verification: Verification,
}

impl<SPI, CE, PWR, TXEN, AM, DR, CD, D> Nrf905<SPI, CE, PWR, TXEN, AM, DR, CD, D> {
    /// Current operating mode
    pub fn mode(&self) -> OperatingMode {
        self.modes.mode()
    }

    /// Outcome of the most recent configuration read-back, including the one done by `new`
    pub fn verification(&self) -> Verification {
        self.verification
    }

    /// Releases the bus, the control lines, the status lines and the delay.
    #[allow(clippy::type_complexity)]
    pub fn release(
        self,
    ) -> (
        SPI,
        ControlPins<CE, PWR, TXEN>,
        StatusLines<AM, DR, CD>,
        D,
    ) {
        (
            self.transport.release(),
            self.modes.release(),
            self.lines,
            self.delay,
        )
    }
}

impl<SPI, CE, PWR, TXEN, AM, DR, CD, D> Nrf905<SPI, CE, PWR, TXEN, AM, DR, CD, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    PWR: OutputPin,
    TXEN: OutputPin,
    D: DelayNs,
{
    /// Creates the driver, powers the chip down and writes `config`.
    ///
    /// The configuration is validated before any line or the bus is touched. A read-back
    /// mismatch does not fail construction, it is kept in [`verification`](Self::verification).
    ///
    /// # Errors
    /// * `Error::Validation` - `config` cannot be represented by the chip
    /// * `Error::Pin` - driving a control line failed
    /// * `Error::Transport` - SPI communication failed
    pub fn new(
        spi: SPI,
        pins: ControlPins<CE, PWR, TXEN>,
        lines: StatusLines<AM, DR, CD>,
        delay: D,
        config: &Config,
    ) -> Result<Self, Error> {
        let rf = RfConfig::try_from(config)?;
        let mut device = Self {
            transport: Transport::new(spi),
            modes: ModeControl::new(pins)?,
            lines,
            delay,
            verification: Verification::Match,
        };
        device.apply(&rf)?;
        Ok(device)
    }

    /// Writes `config` and reads it back.
    ///
    /// A mismatch is reported through the returned [`Verification`], never as an error.
    pub fn configure(&mut self, config: &Config) -> Result<Verification, Error> {
        let rf = RfConfig::try_from(config)?;
        self.apply(&rf)
    }

    /// Writes `config` without reading it back.
    pub fn write_config(&mut self, config: &Config) -> Result<(), Error> {
        let rf = RfConfig::try_from(config)?;
        self.transport
            .write_command(WriteInstruction::RfConfig, &rf.encode())?;
        Ok(())
    }

    /// Reads and decodes the configuration register.
    pub fn read_config(&mut self) -> Result<RfConfig, Error> {
        let mut data = [0u8; RF_CONFIG_LEN];
        self.transport
            .read_command(ReadInstruction::RfConfig, &mut data)?;
        Ok(RfConfig::from_bytes(data)?)
    }

    fn apply(&mut self, rf: &RfConfig) -> Result<Verification, Error> {
        let written = rf.encode();
        #[cfg(feature = "defmt")]
        defmt::debug!("writing RF config {}", rf);
        self.transport
            .write_command(WriteInstruction::RfConfig, &written)?;

        let mut read_back = [0u8; RF_CONFIG_LEN];
        self.transport
            .read_command(ReadInstruction::RfConfig, &mut read_back)?;
        self.verification = Verification::compare(written, read_back);
        Ok(self.verification)
    }

    /// Retunes to `frequency` (Hz) with `power`, leaving the rest of the configuration alone.
    pub fn set_channel(&mut self, frequency: u32, power: OutputPower) -> Result<(), Error> {
        let channel = Channel::from_frequency(frequency)?;
        self.transport.write_command(
            WriteInstruction::ChannelConfig { channel, power },
            &[(channel.number() & 0xFF) as u8],
        )?;
        Ok(())
    }

    /// Sets the address prepended to transmitted packets.
    ///
    /// # Errors
    /// `ValidationError::TxAddressLength` unless `address` is 1 to 4 bytes long.
    pub fn set_tx_address(&mut self, address: &[u8]) -> Result<(), Error> {
        if AddressWidth::from_len(address.len()).is_none() {
            return Err(ValidationError::TxAddressLength(address.len()).into());
        }
        self.transport
            .write_command(WriteInstruction::TxAddress, address)?;
        Ok(())
    }

    /// Reads the full 4-byte transmit address register.
    pub fn tx_address(&mut self) -> Result<[u8; 4], Error> {
        let mut address = [0u8; 4];
        self.transport
            .read_command(ReadInstruction::TxAddress, &mut address)?;
        Ok(address)
    }

    /// Reads back the loaded transmit payload into `buffer`.
    pub fn read_tx_payload(&mut self, buffer: &mut [u8]) -> Result<(), Error> {
        self.transport
            .read_command(ReadInstruction::TxPayload, buffer)?;
        Ok(())
    }

    /// Reads the status register.
    pub fn status(&mut self) -> Result<Status, Error> {
        self.transport.read_status()
    }

    /// AM, from its line when wired, otherwise from the status register.
    pub fn address_match(&mut self) -> Result<bool, Error>
    where
        AM: StatusSignal,
    {
        self.lines
            .address_match
            .sample(&mut self.transport, Status::ADDRESS_MATCH)
    }

    /// DR, from its line when wired, otherwise from the status register.
    pub fn data_ready(&mut self) -> Result<bool, Error>
    where
        DR: StatusSignal,
    {
        self.lines
            .data_ready
            .sample(&mut self.transport, Status::DATA_READY)
    }

    /// CD, only available on its dedicated line.
    ///
    /// # Errors
    /// `Error::Unavailable` when the driver was built without a carrier detect line.
    pub fn carrier_detect(&mut self) -> Result<bool, Error>
    where
        CD: CarrierSignal,
    {
        self.lines.carrier_detect.carrier_detect()
    }

    /// Drops all control lines. Always allowed.
    pub fn power_down(&mut self) -> Result<(), Error> {
        self.modes.power_down()
    }

    /// Powers up from power down and waits for the crystal to settle.
    pub fn standby(&mut self) -> Result<(), Error> {
        self.modes.standby(&mut self.delay)
    }

    /// Enters receive mode. Allowed from standby, and a no-op while already receiving.
    pub fn enable_receive(&mut self) -> Result<(), Error> {
        self.modes.enable_receive()
    }

    /// Waits up to `timeout` for a packet and reads it into `buffer`.
    ///
    /// Enters receive mode first when in standby. `buffer` should be as long as the
    /// configured receive payload width.
    ///
    /// # Errors
    /// * `Error::Validation` - `buffer` longer than 32 bytes
    /// * `Error::IllegalTransition` - not in standby or receive mode
    /// * `Error::Timeout` - no packet arrived, nothing was read
    pub fn receive(&mut self, timeout: Duration, buffer: &mut [u8]) -> Result<(), Error>
    where
        DR: DataReadySignal,
    {
        if buffer.len() > MAX_PAYLOAD {
            return Err(ValidationError::PayloadLength(buffer.len()).into());
        }
        self.modes.enable_receive()?;

        let ready = self.lines.data_ready.wait_for_rising_edge(
            &mut self.transport,
            &mut self.delay,
            timeout,
        )?;
        if !ready {
            return Err(Error::Timeout);
        }

        self.transport
            .read_command(ReadInstruction::RxPayload, buffer)?;
        #[cfg(feature = "defmt")]
        defmt::trace!("received {} bytes", buffer.len());
        Ok(())
    }

    /// Loads `payload`, sends it once and waits up to `timeout` for completion.
    ///
    /// Returns to standby once data ready signals the packet went out. On timeout the
    /// driver stays in transmit mode, recover with [`power_down`](Self::power_down).
    ///
    /// TRX_CE is only pulsed, so the packet goes out once even with `auto_retransmit` set.
    ///
    /// # Errors
    /// * `Error::IllegalTransition` - not in standby or receive mode, nothing was sent
    /// * `Error::DataPending` - a received packet is still unread, nothing was sent
    /// * `Error::Validation` - payload longer than 32 bytes, nothing was sent
    /// * `Error::Timeout` - the packet did not complete in time
    pub fn transmit(&mut self, timeout: Duration, payload: &[u8]) -> Result<(), Error>
    where
        DR: DataReadySignal,
    {
        self.modes.check(OperatingMode::Transmit)?;
        if payload.len() > MAX_PAYLOAD {
            return Err(ValidationError::PayloadLength(payload.len()).into());
        }
        // DR is also the completion signal, it must start low
        if self
            .lines
            .data_ready
            .sample(&mut self.transport, Status::DATA_READY)?
        {
            return Err(Error::DataPending);
        }
        self.transport
            .write_command(WriteInstruction::TxPayload, payload)?;
        self.modes.start_transmit(&mut self.delay)?;

        let sent = self.lines.data_ready.wait_for_rising_edge(
            &mut self.transport,
            &mut self.delay,
            timeout,
        )?;
        if !sent {
            return Err(Error::Timeout);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("sent {} bytes", payload.len());
        self.modes.finish_transmit()
    }
}

impl<SPI, CE, PWR, TXEN, AM, DR, CD, D> Nrf905<SPI, CE, PWR, TXEN, AM, DR, CD, D>
where
    SPI: AsyncSpiDevice,
    CE: OutputPin,
    PWR: OutputPin,
    TXEN: OutputPin,
{
    /// Asynchronously creates the driver, powers the chip down and writes `config`.
    ///
    /// This is the async version of [`new`](Nrf905::new).
    pub async fn new_async(
        spi: SPI,
        pins: ControlPins<CE, PWR, TXEN>,
        lines: StatusLines<AM, DR, CD>,
        delay: D,
        config: &Config,
    ) -> Result<Self, Error> {
        let rf = RfConfig::try_from(config)?;
        let mut device = Self {
            transport: Transport::new(spi),
            modes: ModeControl::new(pins)?,
            lines,
            delay,
            verification: Verification::Match,
        };
        device.apply_async(&rf).await?;
        Ok(device)
    }

    /// Asynchronously writes `config` and reads it back.
    ///
    /// This is the async version of [`configure`](Nrf905::configure).
    pub async fn configure_async(&mut self, config: &Config) -> Result<Verification, Error> {
        let rf = RfConfig::try_from(config)?;
        self.apply_async(&rf).await
    }

    /// Asynchronously reads and decodes the configuration register.
    ///
    /// This is the async version of [`read_config`](Nrf905::read_config).
    pub async fn read_config_async(&mut self) -> Result<RfConfig, Error> {
        let mut data = [0u8; RF_CONFIG_LEN];
        self.transport
            .read_command_async(ReadInstruction::RfConfig, &mut data)
            .await?;
        Ok(RfConfig::from_bytes(data)?)
    }

    /// Asynchronously reads the status register.
    ///
    /// This is the async version of [`status`](Nrf905::status).
    pub async fn status_async(&mut self) -> Result<Status, Error> {
        self.transport.read_status_async().await
    }

    async fn apply_async(&mut self, rf: &RfConfig) -> Result<Verification, Error> {
        let written = rf.encode();
        self.transport
            .write_command_async(WriteInstruction::RfConfig, &written)
            .await?;

        let mut read_back = [0u8; RF_CONFIG_LEN];
        self.transport
            .read_command_async(ReadInstruction::RfConfig, &mut read_back)
            .await?;
        self.verification = Verification::compare(written, read_back);
        Ok(self.verification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{Line, NotConnected, PolledEdge, StatusPoll};
    use crate::registers::{CrcMode, CrystalFrequency};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use std::vec::Vec;

    // 868.2 MHz, 3-byte address 93 9a 0c, 24-byte payloads, 16 MHz crystal, CRC16
    const IMAGE: [u8; RF_CONFIG_LEN] = [
        0x75, 0x02, 0x33, 0x18, 0x18, 0x93, 0x9a, 0x0c, 0x00, 0xD8,
    ];

    type Radio<AM, DR, CD> = Nrf905<SpiMock<u8>, PinMock, PinMock, PinMock, AM, DR, CD, NoopDelay>;

    fn config() -> Config {
        Config {
            center_frequency: 868_200_000,
            output_power: OutputPower::Minus10Dbm,
            reduced_rx_current: false,
            auto_retransmit: false,
            tx_address_width: AddressWidth::Three,
            rx_payload_width: 24,
            tx_payload_width: 24,
            crystal: CrystalFrequency::Mhz16,
            crc: CrcMode::Crc16,
            ..Config::default()
        }
        .with_rx_address(&[0x93, 0x9a, 0x0c])
        .unwrap()
    }

    fn frame(write: &[u8], read: &[u8]) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer(write.to_vec(), read.to_vec()),
            SpiTransaction::transaction_end(),
        ]
    }

    fn read_config_frame(read_back: [u8; RF_CONFIG_LEN]) -> [SpiTransaction<u8>; 3] {
        let mut read = vec![0x00];
        read.extend_from_slice(&read_back);
        frame(&[0x10, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF], &read)
    }

    /// W_CONFIG followed by R_CONFIG returning `read_back`
    fn configure_frames(read_back: [u8; RF_CONFIG_LEN]) -> Vec<SpiTransaction<u8>> {
        let mut write = vec![0x00];
        write.extend_from_slice(&IMAGE);

        let mut frames = Vec::new();
        frames.extend(frame(&write, &[0x00; RF_CONFIG_LEN + 1]));
        frames.extend(read_config_frame(read_back));
        frames
    }

    fn status_frame(status: u8) -> [SpiTransaction<u8>; 3] {
        frame(&[0xFF], &[status])
    }

    fn levels(states: &[State]) -> PinMock {
        let transactions: Vec<PinTransaction> =
            states.iter().map(|&state| PinTransaction::set(state)).collect();
        PinMock::new(&transactions)
    }

    /// Control lines that see the initial power down followed by `ce`, `pwr` and `txen`
    fn pins(ce: &[State], pwr: &[State], txen: &[State]) -> ControlPins<PinMock, PinMock, PinMock> {
        let after_power_down = |rest: &[State]| {
            let mut states = vec![State::Low];
            states.extend_from_slice(rest);
            levels(&states)
        };
        ControlPins {
            chip_enable: after_power_down(ce),
            power_up: after_power_down(pwr),
            tx_enable: after_power_down(txen),
        }
    }

    fn finish<AM, DR, CD>(radio: Radio<AM, DR, CD>) -> StatusLines<AM, DR, CD> {
        let (mut spi, mut pins, lines, _) = radio.release();
        spi.done();
        pins.chip_enable.done();
        pins.power_up.done();
        pins.tx_enable.done();
        lines
    }

    fn polled_radio(
        spi: Vec<SpiTransaction<u8>>,
        pins: ControlPins<PinMock, PinMock, PinMock>,
    ) -> Radio<StatusPoll, StatusPoll, NotConnected> {
        Nrf905::new(
            SpiMock::new(&spi),
            pins,
            StatusLines::polled(),
            NoopDelay::new(),
            &config(),
        )
        .unwrap()
    }

    #[test]
    fn new_powers_down_and_writes_config() {
        let radio = polled_radio(configure_frames(IMAGE), pins(&[], &[], &[]));
        assert_eq!(radio.mode(), OperatingMode::PowerDown);
        assert_eq!(radio.verification(), Verification::Match);
        finish(radio);
    }

    #[test]
    fn new_keeps_read_back_mismatch() {
        let read_back = [0x00; RF_CONFIG_LEN];
        let radio = polled_radio(configure_frames(read_back), pins(&[], &[], &[]));

        assert_eq!(
            radio.verification(),
            Verification::Mismatch {
                written: IMAGE,
                read_back,
            }
        );
        assert!(!radio.verification().is_match());

        finish(radio);
    }

    #[test]
    fn configure_reports_mismatch_without_failing() {
        let mut read_back = IMAGE;
        read_back[3] = 0x20;
        let mut spi = configure_frames(IMAGE);
        spi.extend(configure_frames(read_back));
        let mut radio = polled_radio(spi, pins(&[], &[], &[]));

        assert_eq!(
            radio.configure(&config()),
            Ok(Verification::Mismatch {
                written: IMAGE,
                read_back,
            })
        );
        assert!(!radio.verification().is_match());

        finish(radio);
    }

    #[test]
    fn read_config_decodes_register() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(read_config_frame(IMAGE));
        let mut radio = polled_radio(spi, pins(&[], &[], &[]));

        let rf = radio.read_config().unwrap();
        assert_eq!(rf.rx_address(), &[0x93, 0x9a, 0x0c]);
        assert_eq!(Config::from(&rf), config());

        finish(radio);
    }

    #[test]
    fn carrier_detect_without_line_is_unavailable() {
        let mut radio = polled_radio(configure_frames(IMAGE), pins(&[], &[], &[]));
        assert_eq!(radio.carrier_detect(), Err(Error::Unavailable));
        finish(radio);
    }

    #[test]
    fn status_flags_fall_back_to_register() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x80));
        spi.extend(status_frame(0x80));
        let mut radio = polled_radio(spi, pins(&[], &[], &[]));

        assert_eq!(radio.address_match(), Ok(true));
        assert_eq!(radio.data_ready(), Ok(false));

        finish(radio);
    }

    #[test]
    fn status_flags_from_lines() {
        let lines = StatusLines::polled()
            .with_address_match(PinMock::new(&[PinTransaction::get(State::High)]))
            .with_carrier_detect(PinMock::new(&[PinTransaction::get(State::Low)]));
        let mut radio = Nrf905::new(
            SpiMock::new(&configure_frames(IMAGE)),
            pins(&[], &[], &[]),
            lines,
            NoopDelay::new(),
            &config(),
        )
        .unwrap();

        assert_eq!(radio.address_match(), Ok(true));
        assert_eq!(radio.carrier_detect(), Ok(false));

        let mut lines = finish(radio);
        lines.address_match.0.done();
        lines.carrier_detect.0.done();
    }

    #[test]
    fn receive_requires_standby() {
        let mut radio = polled_radio(configure_frames(IMAGE), pins(&[], &[], &[]));
        let mut buffer = [0u8; 24];

        assert_eq!(
            radio.receive(Duration::ZERO, &mut buffer),
            Err(Error::IllegalTransition {
                from: OperatingMode::PowerDown,
                to: OperatingMode::Receive,
            })
        );

        finish(radio);
    }

    #[test]
    fn receive_times_out_without_reading_payload() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x00));
        let mut radio = polled_radio(spi, pins(&[State::High], &[State::High], &[]));
        let mut buffer = [0u8; 24];

        radio.standby().unwrap();
        assert_eq!(
            radio.receive(Duration::ZERO, &mut buffer),
            Err(Error::Timeout)
        );
        assert_eq!(radio.mode(), OperatingMode::Receive);

        finish(radio);
    }

    #[test]
    fn receive_times_out_on_data_ready_line() {
        let lines = StatusLines::polled().with_data_ready(PolledEdge::new(
            PinMock::new(&[PinTransaction::get(State::Low)]),
            NoopDelay::new(),
        ));
        let mut radio = Nrf905::new(
            SpiMock::new(&configure_frames(IMAGE)),
            pins(&[State::High], &[State::High], &[]),
            lines,
            NoopDelay::new(),
            &config(),
        )
        .unwrap();
        let mut buffer = [0u8; 24];

        radio.standby().unwrap();
        assert_eq!(
            radio.receive(Duration::ZERO, &mut buffer),
            Err(Error::Timeout)
        );

        let lines = finish(radio);
        let Line(edge) = lines.data_ready;
        edge.release().0.done();
    }

    #[test]
    fn receive_reads_payload_on_data_ready() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x20));
        spi.extend(frame(
            &[0x24, 0xFF, 0xFF, 0xFF, 0xFF],
            &[0xA0, 0x01, 0x02, 0x03, 0x04],
        ));
        let mut radio = polled_radio(spi, pins(&[State::High], &[State::High], &[]));
        let mut buffer = [0u8; 4];

        radio.standby().unwrap();
        radio.receive(Duration::from_millis(10), &mut buffer).unwrap();
        assert_eq!(buffer, [0x01, 0x02, 0x03, 0x04]);

        finish(radio);
    }

    #[test]
    fn oversized_receive_buffer_is_rejected_first() {
        let mut radio = polled_radio(configure_frames(IMAGE), pins(&[], &[], &[]));
        let mut buffer = [0u8; MAX_PAYLOAD + 1];

        assert_eq!(
            radio.receive(Duration::ZERO, &mut buffer),
            Err(Error::Validation(ValidationError::PayloadLength(33)))
        );
        assert_eq!(radio.mode(), OperatingMode::PowerDown);

        finish(radio);
    }

    #[test]
    fn transmit_pulses_chip_enable_and_returns_to_standby() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x00));
        spi.extend(frame(&[0x20, 0xAA, 0xBB], &[0x00, 0x00, 0x00]));
        spi.extend(status_frame(0x00));
        spi.extend(status_frame(0x20));
        let mut radio = polled_radio(
            spi,
            pins(
                &[State::High, State::Low],
                &[State::High],
                &[State::High, State::Low],
            ),
        );

        // refused before anything reaches the bus
        assert_eq!(
            radio.transmit(Duration::from_millis(10), &[0xAA, 0xBB]),
            Err(Error::IllegalTransition {
                from: OperatingMode::PowerDown,
                to: OperatingMode::Transmit,
            })
        );

        radio.standby().unwrap();
        radio
            .transmit(Duration::from_millis(10), &[0xAA, 0xBB])
            .unwrap();
        assert_eq!(radio.mode(), OperatingMode::Standby);

        finish(radio);
    }

    #[test]
    fn transmit_timeout_stays_in_transmit() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x00));
        spi.extend(frame(&[0x20, 0x55], &[0x00, 0x00]));
        spi.extend(status_frame(0x00));
        let mut radio = polled_radio(
            spi,
            pins(
                &[State::High, State::Low, State::Low],
                &[State::High, State::Low],
                &[State::High, State::Low],
            ),
        );

        radio.standby().unwrap();
        assert_eq!(
            radio.transmit(Duration::ZERO, &[0x55]),
            Err(Error::Timeout)
        );
        assert_eq!(radio.mode(), OperatingMode::Transmit);

        radio.power_down().unwrap();
        assert_eq!(radio.mode(), OperatingMode::PowerDown);

        finish(radio);
    }

    #[test]
    fn transmit_refuses_while_received_packet_is_unread() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x20));
        let mut radio = polled_radio(spi, pins(&[State::High], &[State::High], &[]));

        radio.standby().unwrap();
        radio.enable_receive().unwrap();
        // oversized payloads never reach the bus
        assert_eq!(
            radio.transmit(Duration::from_millis(50), &[0x00; MAX_PAYLOAD + 1]),
            Err(Error::Validation(ValidationError::PayloadLength(33)))
        );
        assert_eq!(
            radio.transmit(Duration::from_millis(50), &[0xAA]),
            Err(Error::DataPending)
        );
        assert_eq!(radio.mode(), OperatingMode::Receive);

        finish(radio);
    }

    #[test]
    fn transmit_from_receive_keeps_pulse_sequence() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x00));
        spi.extend(frame(&[0x20, 0x11], &[0x00, 0x00]));
        spi.extend(status_frame(0x20));
        let mut radio = polled_radio(
            spi,
            pins(
                // receive, then the transmit pulse
                &[State::High, State::High, State::Low],
                &[State::High],
                &[State::High, State::Low],
            ),
        );

        radio.standby().unwrap();
        radio.enable_receive().unwrap();
        radio
            .transmit(Duration::from_millis(10), &[0x11])
            .unwrap();
        assert_eq!(radio.mode(), OperatingMode::Standby);

        finish(radio);
    }

    #[test]
    fn transmit_waits_on_data_ready_line() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(frame(&[0x20, 0x42], &[0x00, 0x00]));
        let lines = StatusLines::polled().with_data_ready(PolledEdge::new(
            PinMock::new(&[
                // idle before the pulse
                PinTransaction::get(State::Low),
                PinTransaction::get(State::Low),
                PinTransaction::get(State::High),
            ]),
            NoopDelay::new(),
        ));
        let mut radio = Nrf905::new(
            SpiMock::new(&spi),
            pins(
                &[State::High, State::Low],
                &[State::High],
                &[State::High, State::Low],
            ),
            lines,
            NoopDelay::new(),
            &config(),
        )
        .unwrap();

        radio.standby().unwrap();
        radio.transmit(Duration::from_millis(10), &[0x42]).unwrap();
        assert_eq!(radio.mode(), OperatingMode::Standby);

        let lines = finish(radio);
        let Line(edge) = lines.data_ready;
        edge.release().0.done();
    }

    #[test]
    fn channel_and_tx_address() {
        let mut spi = configure_frames(IMAGE);
        // +10 dBm, high band, CH_NO[8] clear
        spi.extend(frame(&[0x8E, 0x75], &[0x00, 0x00]));
        spi.extend(frame(&[0x22, 0x93, 0x9a, 0x0c], &[0x00; 4]));
        spi.extend(frame(
            &[0x23, 0xFF, 0xFF, 0xFF, 0xFF],
            &[0x00, 0x93, 0x9a, 0x0c, 0xE7],
        ));
        let mut radio = polled_radio(spi, pins(&[], &[], &[]));

        radio
            .set_channel(868_200_000, OutputPower::Plus10Dbm)
            .unwrap();
        assert_eq!(
            radio.set_channel(600_000_000, OutputPower::Plus10Dbm),
            Err(Error::Validation(ValidationError::Frequency(600_000_000)))
        );

        radio.set_tx_address(&[0x93, 0x9a, 0x0c]).unwrap();
        assert_eq!(
            radio.set_tx_address(&[]),
            Err(Error::Validation(ValidationError::TxAddressLength(0)))
        );
        assert_eq!(radio.tx_address(), Ok([0x93, 0x9a, 0x0c, 0xE7]));

        finish(radio);
    }

    #[test]
    fn read_tx_payload_returns_loaded_bytes() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(frame(&[0x21, 0xFF, 0xFF], &[0x00, 0xAA, 0xBB]));
        let mut radio = polled_radio(spi, pins(&[], &[], &[]));

        let mut payload = [0u8; 2];
        radio.read_tx_payload(&mut payload).unwrap();
        assert_eq!(payload, [0xAA, 0xBB]);

        finish(radio);
    }

    #[tokio::test]
    async fn async_configuration() {
        let mut spi = configure_frames(IMAGE);
        spi.extend(status_frame(0x20));
        let mut radio: Radio<StatusPoll, StatusPoll, NotConnected> = Nrf905::new_async(
            SpiMock::new(&spi),
            pins(&[], &[], &[]),
            StatusLines::polled(),
            NoopDelay::new(),
            &config(),
        )
        .await
        .unwrap();

        let status = radio.status_async().await.unwrap();
        assert!(status.data_ready());

        finish(radio);
    }
}
