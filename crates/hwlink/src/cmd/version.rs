use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("hwlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: hwlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("HWLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("HWLINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "features: device={}, usb={}, cli=true",
        cfg!(feature = "device"),
        cfg!(feature = "usb")
    );
    println!(
        "transports: emulator=udp/{}, usb-hid={}",
        hwlink_transport::DEFAULT_EMULATOR_PORT,
        if cfg!(feature = "usb") { "enabled" } else { "disabled" }
    );

    Ok(SUCCESS)
}
