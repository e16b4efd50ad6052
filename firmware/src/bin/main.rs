#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Ticker};
use gamepad_hub::{Bus, Gamepads, PlayerAssigner};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// How often connection changes and input reports are picked up.
const TICK_HZ: u64 = 100;

/// Slots shared with the Bluetooth stack.
static BUS: StaticCell<Bus> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Gamepad hub starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let bus: &'static Bus = BUS.init(Bus::new());

    // On-board LED on Pico, lit while any gamepad is connected
    let led = Output::new(p.PIN_25, Level::Low);

    spawner.spawn(tick_task(bus, led).unwrap());
    spawner.spawn(outbox_task(bus).unwrap());

    info!("Gamepad hub initialized, waiting for controllers...");
}

/// Tick task - runs the connection tracker and decodes pending reports.
#[embassy_executor::task]
async fn tick_task(bus: &'static Bus, mut led: Output<'static>) {
    let mut gamepads = Gamepads::new(bus).setup(PlayerAssigner::new());
    let mut ticker = Ticker::every(Duration::from_hz(TICK_HZ));

    loop {
        gamepads.update();

        for (slot, leds) in gamepads.callbacks_mut().take_pending() {
            if let Err(e) = gamepads.set_player_leds(slot, leds) {
                warn!("Player LEDs for slot {}: {:?}", slot, e);
            }
        }

        let level = if gamepads.gamepads().next().is_some() {
            Level::High
        } else {
            Level::Low
        };
        led.set_level(level);

        ticker.next().await;
    }
}

/// Outbox task - drains output reports. No Bluetooth stack is wired up yet, so
/// each report is logged and dropped.
#[embassy_executor::task]
async fn outbox_task(bus: &'static Bus) {
    loop {
        let command = bus.command().await;
        // TODO: write `command.report` to the HID interrupt channel of
        // `command.handle` once a Bluetooth host stack is integrated.
        info!(
            "Output for slot {} (handle {}): {} bytes",
            command.slot,
            command.handle.0,
            command.report.len()
        );
    }
}
