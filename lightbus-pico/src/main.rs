#![no_std]
#![no_main]

mod bus;
mod outputs;

use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};

use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c_slave::{self, Command, ReadStatus};
use embassy_rp::peripherals::I2C0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Timer;

use lightbus::{ChannelBank, RegisterEngine, CLASS_LIGHT_CONTROLLER, FRAME_CAPACITY};

use bus::BusQueue;
use outputs::PwmOutputs;

/// 7-bit address the controller answers on.
const BUS_ADDRESS: u16 = 0x08;
/// Number of PWM output channels wired on the board.
const CHANNELS: usize = 14;
/// PWM carrier frequency for every LED string.
const PWM_FREQUENCY_HZ: u32 = 1_000;

type Bank = ChannelBank<PwmOutputs, CHANNELS>;
type Engine = RegisterEngine<CHANNELS>;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c_slave::InterruptHandler<I2C0>;
});

/// Answers one read transaction byte by byte, so the engine's pointer
/// advances exactly as far as the master clocks.
async fn serve_read(
    bus: &mut i2c_slave::I2cSlave<'_, I2C0>,
    queue: &mut BusQueue,
    engine: &mut Engine,
    bank: &mut Bank,
) {
    loop {
        queue.request_read();
        engine.poll(queue, bank);
        let byte = queue.take_outbound().unwrap_or(0);
        match bus.respond_to_read(&[byte]).await {
            Ok(ReadStatus::NeedMoreBytes) => {}
            Ok(ReadStatus::Done) | Ok(ReadStatus::LeftoverBytes(_)) => break,
            Err(e) => {
                rprintln!("i2c read error: {:?}", e);
                break;
            }
        }
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_init_print!();
    let p = embassy_rp::init(Default::default());

    // Boot indicator blink on the onboard LED.
    let mut indicator = Output::new(p.PIN_25, Level::Low);
    for _ in 0..10 {
        indicator.toggle();
        Timer::after_millis(50).await;
    }

    let initial = PwmConfig::default();
    let outputs = PwmOutputs::new([
        Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_18, p.PIN_3, initial.clone()),
        Pwm::new_output_ab(p.PWM_SLICE2, p.PIN_20, p.PIN_5, initial.clone()),
        Pwm::new_output_ab(p.PWM_SLICE3, p.PIN_22, p.PIN_7, initial.clone()),
        Pwm::new_output_ab(p.PWM_SLICE4, p.PIN_8, p.PIN_9, initial.clone()),
        Pwm::new_output_ab(p.PWM_SLICE5, p.PIN_26, p.PIN_11, initial.clone()),
        Pwm::new_output_ab(p.PWM_SLICE6, p.PIN_28, p.PIN_13, initial.clone()),
        Pwm::new_output_ab(p.PWM_SLICE7, p.PIN_14, p.PIN_15, initial),
    ]);
    let mut bank: Bank = ChannelBank::new(outputs, PWM_FREQUENCY_HZ);
    let mut engine: Engine = RegisterEngine::new(CLASS_LIGHT_CONTROLLER);
    let mut queue = BusQueue::new();

    let mut config = i2c_slave::Config::default();
    config.addr = BUS_ADDRESS;
    let mut bus = i2c_slave::I2cSlave::new(p.I2C0, p.PIN_1, p.PIN_0, Irqs, config);

    rprintln!(
        "light controller on 0x{:02x}, {} channels at {} Hz",
        BUS_ADDRESS,
        CHANNELS,
        PWM_FREQUENCY_HZ
    );

    let mut buf = [0u8; FRAME_CAPACITY];
    loop {
        match bus.listen(&mut buf).await {
            Ok(Command::Write(len)) | Ok(Command::GeneralCall(len)) => {
                queue.push_transaction(&buf[..len]);
                engine.poll(&mut queue, &mut bank);
            }
            Ok(Command::Read) => {
                serve_read(&mut bus, &mut queue, &mut engine, &mut bank).await;
            }
            Ok(Command::WriteRead(len)) => {
                queue.push_transaction(&buf[..len]);
                engine.poll(&mut queue, &mut bank);
                serve_read(&mut bus, &mut queue, &mut engine, &mut bank).await;
            }
            Err(e) => rprintln!("i2c error: {:?}", e),
        }
    }
}
