//! # PWM Outputs
//!
//! Binds the channel bank to the RP2040's hardware PWM. The 14 LED GPIOs
//! (3, 5, 7, 8, 9, 11, 13, 14, 15, 18, 20, 22, 26, 28) are exactly the A
//! and B outputs of PWM slices 1–7, so every channel gets true hardware
//! PWM and slice-mates share a carrier frequency, which is what the board
//! wants anyway.

use embassy_rp::clocks;
use embassy_rp::pwm::{Config, Pwm};
use fixed::traits::ToFixed;
use lightbus::PwmDriver;

use crate::CHANNELS;

/// Number of hardware PWM slices in use.
pub const SLICES: usize = 7;

/// Which output of a slice drives a channel.
#[derive(Debug, Clone, Copy)]
enum Half {
    A,
    B,
}

/// Channel index → (slice array index, output half), in the wiring order of
/// the LED header.
const OUTPUT_MAP: [(usize, Half); CHANNELS] = [
    (0, Half::B), // GPIO 3
    (1, Half::B), // GPIO 5
    (2, Half::B), // GPIO 7
    (3, Half::A), // GPIO 8
    (3, Half::B), // GPIO 9
    (4, Half::B), // GPIO 11
    (5, Half::B), // GPIO 13
    (6, Half::A), // GPIO 14
    (6, Half::B), // GPIO 15
    (0, Half::A), // GPIO 18
    (1, Half::A), // GPIO 20
    (2, Half::A), // GPIO 22
    (4, Half::A), // GPIO 26
    (5, Half::A), // GPIO 28
];

/// [`PwmDriver`] over the seven hardware slices.
///
/// Keeps a shadow `Config` per slice so updating one output's compare value
/// does not disturb its slice-mate.
pub struct PwmOutputs {
    slices: [Pwm<'static>; SLICES],
    configs: [Config; SLICES],
    tops: [u16; SLICES],
}

impl PwmOutputs {
    /// Takes the configured slices in hardware order PWM1..PWM7, with the
    /// A/B pins assigned per [`OUTPUT_MAP`].
    pub fn new(slices: [Pwm<'static>; SLICES]) -> Self {
        Self {
            slices,
            configs: core::array::from_fn(|_| Config::default()),
            tops: [u16::MAX; SLICES],
        }
    }
}

impl PwmDriver for PwmOutputs {
    fn configure(&mut self, channel: usize, frequency_hz: u32) {
        let Some(&(slice, _)) = OUTPUT_MAP.get(channel) else {
            return;
        };
        // Smallest clock divider that keeps a full period inside the
        // 16-bit counter, then the exact wrap value for the frequency.
        let clk = clocks::clk_sys_freq();
        let divider = clk.div_ceil(frequency_hz * 65_536).clamp(1, 255);
        let top = (clk / (divider * frequency_hz)).saturating_sub(1) as u16;

        let config = &mut self.configs[slice];
        config.divider = (divider as u16).to_fixed();
        config.top = top;
        self.tops[slice] = top;
        self.slices[slice].set_config(config);
    }

    fn set_duty(&mut self, channel: usize, duty: u16) {
        let Some(&(slice, half)) = OUTPUT_MAP.get(channel) else {
            return;
        };
        // Rescale the 0..=65535 wire range onto the slice counter range;
        // compare == top + 1 holds the output high for the whole period.
        let compare = ((u32::from(duty) * (u32::from(self.tops[slice]) + 1)) / 65_535) as u16;

        let config = &mut self.configs[slice];
        match half {
            Half::A => config.compare_a = compare,
            Half::B => config.compare_b = compare,
        }
        self.slices[slice].set_config(config);
    }
}
