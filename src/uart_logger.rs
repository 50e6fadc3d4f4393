//! Debug log output on UART1.
//!
//! The console UART belongs to the shell, so diagnostics drain to a second,
//! TX-only UART. Requires an external USB-UART adapter (CH340, CP2102, etc).
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```
//!
//! # Line format
//!
//! ```text
//! (W) [   1234567] busy, line discarded
//! ```

use crate::logging::LogEntry;
use crate::shell_snprintf;

#[cfg(target_os = "espidf")]
use crate::{RX_LOG_STREAM, SHELL_LOG_STREAM};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// UART configuration for logging.
#[derive(Debug, Clone, Copy)]
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 6, // GPIO6 - UART1 TX
        }
    }
}

/// Format log entry into `buf`, returns bytes written.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    shell_snprintf!(
        buf,
        "(%c) [%10ld] %s\r\n",
        entry.level.tag(),
        entry.timestamp_us,
        entry.message()
    )
}

/// Initialize UART1 TX-only for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// Logger task: drains both log streams to UART1 forever.
#[cfg(target_os = "espidf")]
pub fn uart_logger_task(uart: &mut UartTxDriver<'_>) -> ! {
    // Room for the longest message plus prefix and CRLF
    let mut line = [0u8; crate::logging::MAX_MSG_LEN + 24];
    let mut last_dropped_report = 0i64;

    loop {
        let mut work_done = false;

        while let Some(entry) = SHELL_LOG_STREAM.drain().or_else(|| RX_LOG_STREAM.drain()) {
            let len = format_log_entry(&entry, &mut line);
            let _ = uart.write(&line[..len]);
            work_done = true;
        }

        // Report dropped messages every 10 seconds
        let now = crate::logging::timestamp_us();
        if now - last_dropped_report > 10_000_000 {
            let shell_dropped = SHELL_LOG_STREAM.dropped();
            let rx_dropped = RX_LOG_STREAM.dropped();

            if shell_dropped > 0 || rx_dropped > 0 {
                let len = shell_snprintf!(
                    &mut line,
                    "(W) Log dropped: SHELL=%u, RX=%u\r\n",
                    shell_dropped,
                    rx_dropped
                );
                let _ = uart.write(&line[..len]);

                SHELL_LOG_STREAM.reset_dropped();
                RX_LOG_STREAM.reset_dropped();
            }

            last_dropped_report = now;
        }

        if !work_done {
            // SAFETY: plain FreeRTOS delay from task context
            unsafe {
                esp_idf_svc::sys::vTaskDelay(10);
            }
        }
    }
}
