use crate::error::BoardError;

// Device names the board usually shows up under
const BOARD_PORT_PREFIXES: [&str; 5] = [
    "/dev/ttyUSB",
    "/dev/ttyACM",
    "/dev/tty.",
    "/dev/cu.",
    "/dev/rfcomm",
];

/// Names of the serial ports on this machine, likely board ports first.
pub fn list_ports() -> Result<Vec<String>, BoardError> {
    let ports = serialport::available_ports()?;
    Ok(rank_ports(ports.into_iter().map(|p| p.port_name)))
}

fn rank_ports(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().collect();
    // stable, so each group keeps enumeration order
    names.sort_by_key(|name| !is_board_port(name));
    names
}

fn is_board_port(name: &str) -> bool {
    BOARD_PORT_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}
