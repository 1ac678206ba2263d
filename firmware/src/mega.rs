use arduino_hal::{
    hal::port::{PB0, PD2, PD3, PE0, PE1},
    pac::{USART0, USART1},
    port::{
        mode::{Input, Output},
        Pin,
    },
    spi::ChipSelectPin,
    Spi, Usart,
};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};

use crate::devices::SerialLink;

/// USART0, wired to the USB bridge. Carries the debug output.
pub type DebugSerial = Usart<USART0, Pin<Input, PE0>, Pin<Output, PE1>>;

/// USART1 (RX1 = D19, TX1 = D18). Wired to the motion controller.
pub type ControllerSerial = Usart<USART1, Pin<Input, PD2>, Pin<Output, PD3>>;

/// [ControllerSerial], as seen by the feeder.
pub type ControllerLink = SerialLink<USART1, Pin<Input, PD2>, Pin<Output, PD3>>;

/// The SD card's SPI device, with chip select on D53.
pub type SdSpi = ExclusiveDevice<Spi, ChipSelectPin<PB0>, NoDelay>;
