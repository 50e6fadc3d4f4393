//! Command table and dispatcher

use super::{ShellError, ShellResult};
use crate::config::RX_BUFFER_SIZE;
use crate::shell_printf;
use crate::sink::Sink;

/// Command handler.
///
/// Plain functions `fn(&str, &mut dyn Sink) -> ShellResult` implement this,
/// so static tables can point straight at them.
pub trait Handler: Sync {
    /// Run the command. `args` is the line after the command token.
    fn call(&self, args: &str, out: &mut dyn Sink) -> ShellResult;
}

impl<F> Handler for F
where
    F: Fn(&str, &mut dyn Sink) -> ShellResult + Sync,
{
    #[inline]
    fn call(&self, args: &str, out: &mut dyn Sink) -> ShellResult {
        self(args, out)
    }
}

/// Command descriptor
pub struct CommandDescriptor {
    /// Upper-case name. An empty name ends the table.
    pub name: &'static str,
    pub brief: &'static str,
    pub handler: &'static dyn Handler,
}

/// `HELP [cmd]` over the table returned by its accessor.
///
/// ```ignore
/// fn table() -> &'static [CommandDescriptor] { MY_COMMANDS }
/// static MY_HELP: Help = Help(table);
/// ```
pub struct Help(pub fn() -> &'static [CommandDescriptor]);

impl Handler for Help {
    fn call(&self, args: &str, out: &mut dyn Sink) -> ShellResult {
        let commands = (self.0)();

        if let Some(name) = args.split_whitespace().next() {
            // Help for specific command
            let mut upper = [0u8; RX_BUFFER_SIZE];
            let key = upper.get_mut(..name.len()).ok_or(ShellError::UnknownCommand)?;
            key.copy_from_slice(name.as_bytes());
            key.make_ascii_uppercase();

            let c = find(commands, key).ok_or(ShellError::UnknownCommand)?;
            let _ = shell_printf!(out, "%s: %s\r\n", c.name, c.brief);
        } else {
            for c in commands.iter().take_while(|c| !c.name.is_empty()) {
                let _ = shell_printf!(out, "  %-8s %s\r\n", c.name, c.brief);
            }
        }
        Ok(())
    }
}

fn builtin_commands() -> &'static [CommandDescriptor] {
    COMMANDS
}

static HELP: Help = Help(builtin_commands);

/// Built-in commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "HELP", brief: "List commands", handler: &HELP },
    CommandDescriptor { name: "STATUS", brief: "System status", handler: &cmd_status },
    CommandDescriptor { name: "VERSION", brief: "Firmware version", handler: &cmd_version },
    CommandDescriptor { name: "ECHO", brief: "Print arguments", handler: &cmd_echo },
    CommandDescriptor { name: "RESET", brief: "Restart system", handler: &cmd_reset },
];

/// Token bytes are printable and not space
#[inline]
fn is_token_byte(b: u8) -> bool {
    b > 0x20 && b < 0x7F
}

/// Find a command by exact (already upper-cased) name.
///
/// Scans in table order and stops at the first entry with an empty name.
pub fn find<'t>(
    commands: &'t [CommandDescriptor],
    name: &[u8],
) -> Option<&'t CommandDescriptor> {
    commands
        .iter()
        .take_while(|c| !c.name.is_empty())
        .find(|c| c.name.as_bytes() == name)
}

/// Run a committed line.
///
/// The leading token is upper-cased in place, then matched exactly against
/// `commands`. The matched handler gets the rest of the line with the
/// separator skipped.
pub fn dispatch(
    commands: &[CommandDescriptor],
    line: &mut [u8],
    out: &mut dyn Sink,
) -> ShellResult {
    let token_len = line.iter().take_while(|&&b| is_token_byte(b)).count();
    if token_len == 0 {
        return Err(ShellError::UnknownCommand);
    }

    line[..token_len].make_ascii_uppercase();
    let (token, rest) = line.split_at(token_len);

    let cmd = find(commands, token).ok_or(ShellError::UnknownCommand)?;

    let args_start = rest.iter().position(|&b| is_token_byte(b)).unwrap_or(rest.len());
    let args = core::str::from_utf8(&rest[args_start..]).unwrap_or("");

    cmd.handler.call(args, out)
}

// --- Command Implementations ---

fn cmd_status(_args: &str, out: &mut dyn Sink) -> ShellResult {
    #[cfg(target_os = "espidf")]
    {
        let uptime_us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        let heap_free = unsafe { esp_idf_svc::sys::esp_get_free_heap_size() };
        let heap_min = unsafe { esp_idf_svc::sys::esp_get_minimum_free_heap_size() };

        let _ = shell_printf!(out, "Uptime       : %lds\r\n", uptime_us / 1_000_000);
        let _ = shell_printf!(out, "Heap free    : %u bytes\r\n", heap_free);
        let _ = shell_printf!(out, "Heap min     : %u bytes\r\n", heap_min);
    }

    #[cfg(not(target_os = "espidf"))]
    {
        let _ = shell_printf!(out, "Status       : running on host\r\n");
    }

    let _ = shell_printf!(out, "Input drops  : %u\r\n", crate::input::CONSOLE_INPUT.dropped());
    let _ = shell_printf!(
        out,
        "Log drops    : %u\r\n",
        crate::SHELL_LOG_STREAM.dropped() + crate::RX_LOG_STREAM.dropped()
    );
    Ok(())
}

fn cmd_version(_args: &str, out: &mut dyn Sink) -> ShellResult {
    let _ = shell_printf!(out, "%s\r\n", crate::config::VERSION);
    Ok(())
}

fn cmd_echo(args: &str, out: &mut dyn Sink) -> ShellResult {
    let _ = shell_printf!(out, "%s\r\n", args);
    Ok(())
}

fn cmd_reset(_args: &str, out: &mut dyn Sink) -> ShellResult {
    let _ = shell_printf!(out, "Restarting...\r\n");

    #[cfg(target_os = "espidf")]
    unsafe {
        esp_idf_svc::sys::esp_restart();
    }

    Ok(())
}
