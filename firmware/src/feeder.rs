use arduino_hal::{
    default_serial, delay_ms,
    hal::port::PE4,
    pins,
    prelude::*,
    spi::{SerialClockRate, Settings},
    Adc, Delay, Peripherals, Pins, Spi, Usart,
};
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::SdCard;
use patternfeed::{
    Board, Config, ControlLoop, InputMonitor, MilliSeconds, ReshufflePolicy,
    Scheduler,
};
use rand::{rngs::SmallRng, SeedableRng};
use ufmt::uwriteln;

use crate::{
    devices::{seed_from_noise, Button, SdStorage, SerialLink, TickClock},
    mega::{ControllerLink, ControllerSerial, DebugSerial, SdSpi},
};

/// Most patterns the catalog can hold.
const MAX_PATTERNS: usize = 32;

type FeederLoop = ControlLoop<
    SdStorage<SdSpi, Delay>,
    ControllerLink,
    TickClock,
    DebugSerial,
    Button<PE4>,
    SmallRng,
    MAX_PATTERNS,
>;

/// The pattern feeder, as wired on an Arduino Mega 2560.
///
/// - D2: operator button to ground.
/// - D18/D19 (USART1): motion controller.
/// - D50-D53 (SPI): SD card, chip select on D53.
/// - A0: left unconnected, for the random seed.
/// - USB (USART0): debug output.
pub struct Feeder {
    control: FeederLoop,
}

impl Feeder {
    const DEBUG_BAUD_RATE: u32 = 57600;
    const CONTROLLER_BAUD_RATE: u32 = 115200;
    /// Grbl is given this long to finish a line before the feeder gives up.
    const ACK_TIMEOUT: MilliSeconds = MilliSeconds::new(120_000);

    pub fn new() -> Self {
        let peripherals: Peripherals = unsafe { Peripherals::steal() };
        let pins: Pins = pins!(peripherals);
        let mut debug: DebugSerial =
            default_serial!(peripherals, pins, Self::DEBUG_BAUD_RATE);

        // Announce the feeder!
        delay_ms(100);
        uwriteln!(&mut debug, "PATTERNFEED").unwrap_infallible();

        let config = Config {
            ack_timeout: Some(Self::ACK_TIMEOUT),
            ..Config::default()
        };

        // Operator input
        let button = Button::new(pins.d2.into_pull_up_input());
        let monitor = InputMonitor::new(button, config.debounce);

        // Motion controller
        let controller: ControllerSerial = Usart::new(
            peripherals.USART1,
            pins.d19,
            pins.d18.into_output(),
            Self::CONTROLLER_BAUD_RATE.into_baudrate(),
        );

        // SD card; the slowest SPI clock keeps the card happy during its
        // initialization.
        let (spi, chip_select) = Spi::new(
            peripherals.SPI,
            pins.d52.into_output(),
            pins.d51.into_output(),
            pins.d50.into_pull_up_input(),
            pins.d53.into_output(),
            Settings {
                clock: SerialClockRate::OscfOver128,
                ..Default::default()
            },
        );
        let device =
            ExclusiveDevice::new_no_delay(spi, chip_select).unwrap_infallible();
        let storage = SdStorage::new(SdCard::new(device, Delay::new()));

        // Random seed
        let mut adc = Adc::new(peripherals.ADC, Default::default());
        let noise = pins.a0.into_analog_input(&mut adc);
        let seed = seed_from_noise(&mut adc, &noise);
        uwriteln!(&mut debug, "INFO: Seed {}", seed as u32).unwrap_infallible();
        let scheduler = Scheduler::new(
            SmallRng::seed_from_u64(seed),
            ReshufflePolicy::FixedCycle,
        );

        let board = Board {
            storage,
            link: SerialLink::new(controller),
            clock: TickClock::new(peripherals.TC1),
            log: debug,
        };
        let control = ControlLoop::new(board, monitor, scheduler, config);

        Self { control }
    }

    /// Runs the feeder forever.
    pub fn run(&mut self) -> ! {
        self.control.run()
    }
}
