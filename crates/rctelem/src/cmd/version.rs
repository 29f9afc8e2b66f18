use rctelem_transport::BaudRate;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("rctelem {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: rctelem");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", target_triple());
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("transports: serial, udp");
    println!("baud_rates: {}", supported_baud_rates());

    Ok(SUCCESS)
}

fn target_triple() -> String {
    if let Some(target) = option_env!("RCTELEM_BUILD_TARGET") {
        return target.to_string();
    }
    format!(
        "{}-unknown-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

fn supported_baud_rates() -> String {
    BaudRate::ALL
        .iter()
        .map(|baud| baud.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_list_includes_common_rates() {
        let rates = supported_baud_rates();
        assert!(rates.contains("57600"));
        assert!(rates.contains("115200"));
    }

    #[test]
    fn target_is_not_empty() {
        assert!(target_triple().contains('-'));
    }
}
