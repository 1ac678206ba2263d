#![no_std]
#![no_main]

mod devices;
mod feeder;
mod mega;

use feeder::Feeder;
use panic_halt as _;

#[arduino_hal::entry]
fn main() -> ! {
    let mut feeder = Feeder::new();
    feeder.run()
}
