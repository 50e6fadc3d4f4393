//! vt100-shell - Main entry point
//!
//! On the device:
//! 1. UART0 is the console, UART1 carries debug logs
//! 2. Received bytes are queued in `CONSOLE_INPUT`
//! 3. Queued bytes are fed to the shell in arrival order
//!
//! On a host build the same loop runs over stdin/stdout.

fn main() {
    #[cfg(target_os = "espidf")]
    if let Err(e) = firmware::run() {
        panic!("shell init failed: {:?}", e);
    }

    #[cfg(not(target_os = "espidf"))]
    host::run();
}

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{self, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    use vt100_shell::config::ShellConfig;
    use vt100_shell::uart_logger::{init_uart_logger, uart_logger_task, UartLoggerConfig};
    use vt100_shell::{
        logging::timestamp_us, rt_error, rt_info, rt_warn, EchoSink, Shell, Transmit, COMMANDS,
        CONSOLE_INPUT, RX_LOG_STREAM, SHELL_LOG_STREAM,
    };

    /// RX poll timeout in RTOS ticks
    const READ_TIMEOUT_TICKS: u32 = 1;

    /// Console TX, one byte per call
    struct ConsoleTx<'a, 'd> {
        uart: &'a UartDriver<'d>,
    }

    impl Transmit for ConsoleTx<'_, '_> {
        fn transmit(&mut self, byte: u8) -> bool {
            matches!(self.uart.write(&[byte]), Ok(1))
        }
    }

    pub fn run() -> Result<(), EspError> {
        esp_idf_svc::sys::link_patches();

        let peripherals = Peripherals::take()?;
        let shell_config = ShellConfig::default();
        let logger_config = UartLoggerConfig::default();

        // Debug log drain on UART1 (GPIO6)
        let mut log_uart =
            init_uart_logger(peripherals.uart1, peripherals.pins.gpio6, &logger_config)?;
        let spawned = std::thread::Builder::new()
            .name("uart_log".into())
            .stack_size(4096)
            .spawn(move || uart_logger_task(&mut log_uart));
        if spawned.is_err() {
            rt_error!(SHELL_LOG_STREAM, timestamp_us(), "logger thread not started");
        }

        // Console on UART0 (U0TXD/U0RXD)
        let console_config = uart::config::Config::default()
            .baudrate(Hertz(shell_config.console_baud_rate));
        #[cfg(not(feature = "esp32p4"))]
        let (console_tx, console_rx, pins) =
            (peripherals.pins.gpio43, peripherals.pins.gpio44, (43, 44));
        #[cfg(feature = "esp32p4")]
        let (console_tx, console_rx, pins) =
            (peripherals.pins.gpio37, peripherals.pins.gpio38, (37, 38));

        let console = UartDriver::new(
            peripherals.uart0,
            console_tx,
            console_rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &console_config,
        )?;

        rt_info!(
            SHELL_LOG_STREAM,
            timestamp_us(),
            "console up at {} baud (tx {}, rx {})",
            shell_config.console_baud_rate,
            pins.0,
            pins.1
        );

        let sink = EchoSink::new(ConsoleTx { uart: &console });
        let mut shell: Shell<'_, _> = Shell::new(sink, COMMANDS);
        shell.start();

        let mut buf = [0u8; 16];
        loop {
            // Receive side: the IDF driver buffers from the ISR, we move
            // whatever arrived into the shell queue
            match console.read(&mut buf, READ_TIMEOUT_TICKS) {
                Ok(n) => {
                    for &b in &buf[..n] {
                        if !CONSOLE_INPUT.push(b) {
                            rt_warn!(
                                RX_LOG_STREAM,
                                timestamp_us(),
                                "input full, dropped 0x{:02x}",
                                b
                            );
                        }
                    }
                }
                Err(e) => {
                    rt_warn!(RX_LOG_STREAM, timestamp_us(), "uart read: {:?}", e);
                    FreeRtos::delay_ms(10);
                }
            }

            // Consumer side: strictly in arrival order
            while let Some(b) = CONSOLE_INPUT.pop() {
                shell.process_byte(b);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::{Read, Write};

    use vt100_shell::{EchoSink, Shell, Transmit, COMMANDS, CONSOLE_INPUT};

    /// Console TX on stdout
    struct StdoutTx(std::io::Stdout);

    impl Transmit for StdoutTx {
        fn transmit(&mut self, byte: u8) -> bool {
            let mut out = self.0.lock();
            out.write_all(&[byte]).and_then(|_| out.flush()).is_ok()
        }
    }

    pub fn run() {
        let sink = EchoSink::new(StdoutTx(std::io::stdout()));
        let mut shell: Shell<'_, _> = Shell::new(sink, COMMANDS);
        shell.start();

        let mut stdin = std::io::stdin().lock();
        let mut buf = [0u8; 64];
        loop {
            let n = match stdin.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            for &b in &buf[..n] {
                CONSOLE_INPUT.push(b);
                // Drain as we go so the queue never overflows on pasted input
                while let Some(b) = CONSOLE_INPUT.pop() {
                    shell.process_byte(b);
                }
            }
        }
    }
}
