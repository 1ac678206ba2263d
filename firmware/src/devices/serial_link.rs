use core::convert::Infallible;

use arduino_hal::{hal::Atmega, prelude::*, usart::UsartOps, Usart};

/// Serial link to the motion controller, over one of the USARTs.
pub struct SerialLink<USART, RX, TX> {
    serial: Usart<USART, RX, TX>,
}
impl<USART, RX, TX> SerialLink<USART, RX, TX>
where
    USART: UsartOps<Atmega, RX, TX>,
{
    /// Creates a new `SerialLink`.
    pub fn new(serial: Usart<USART, RX, TX>) -> Self {
        Self { serial }
    }
}

impl<USART, RX, TX> patternfeed::ControllerLink for SerialLink<USART, RX, TX>
where
    USART: UsartOps<Atmega, RX, TX>,
{
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.serial.write_byte(byte);
        }
        self.serial.flush();
    }

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.serial.read()
    }
}
