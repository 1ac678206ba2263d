use arduino_hal::{hal::port::PF0, port::mode::Analog, port::Pin, Adc};

/// Number of conversions mixed into the seed.
const SAMPLES: u8 = 64;

/// Draws a random seed from an unconnected analog input.
///
/// Only the least significant bits of a floating input are noisy, so each
/// conversion is folded in and the accumulator rotated.
///
/// # Parameters
///
/// - `adc`: ADC to use.
/// - `pin`: A0, which must be left unconnected.
pub fn seed_from_noise(adc: &mut Adc, pin: &Pin<Analog, PF0>) -> u64 {
    let mut seed: u64 = 0;
    for _ in 0..SAMPLES {
        let value = pin.analog_read(adc);
        seed = seed.rotate_left(7) ^ u64::from(value);
    }
    seed
}
