use adda::ads1256::{DataRate, Gain, ScanMode};
use anyhow::bail;

pub const USAGE: &str = "usage: piadda <gain> <rate> [single|diff]
  gain: 1 2 4 8 16 32 64
  rate: 2d5 5 10 15 25 30 50 60 100 500 1000 2000 3750 7500 15000 30000 (SPS)
  mode: single (default, 8 channels) or diff (4 channel pairs)";

pub struct Args {
    pub gain: Gain,
    pub rate: DataRate,
    pub mode: ScanMode,
}

pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Args, anyhow::Error> {
    let Some(gain) = args.next() else {
        bail!("missing gain\n{USAGE}");
    };
    let Some(gain) = parse_gain(&gain) else {
        bail!("unknown gain {gain:?}\n{USAGE}");
    };

    let Some(rate) = args.next() else {
        bail!("missing sample rate\n{USAGE}");
    };
    let Some(rate) = parse_rate(&rate) else {
        bail!("unknown sample rate {rate:?}\n{USAGE}");
    };

    let mode = match args.next() {
        None => ScanMode::SingleEnded,
        Some(mode) => match parse_mode(&mode) {
            Some(mode) => mode,
            None => bail!("unknown mode {mode:?}\n{USAGE}"),
        },
    };

    if args.next().is_some() {
        bail!("too many arguments\n{USAGE}");
    }

    Ok(Args { gain, rate, mode })
}

pub fn parse_gain(token: &str) -> Option<Gain> {
    Some(match token {
        "1" => Gain::Gain1,
        "2" => Gain::Gain2,
        "4" => Gain::Gain4,
        "8" => Gain::Gain8,
        "16" => Gain::Gain16,
        "32" => Gain::Gain32,
        "64" => Gain::Gain64,
        _ => return None,
    })
}

pub fn parse_rate(token: &str) -> Option<DataRate> {
    // "2d5" is the historical spelling for 2.5 SPS.
    Some(match token {
        "2d5" => DataRate::Sps2_5,
        "5" => DataRate::Sps5,
        "10" => DataRate::Sps10,
        "15" => DataRate::Sps15,
        "25" => DataRate::Sps25,
        "30" => DataRate::Sps30,
        "50" => DataRate::Sps50,
        "60" => DataRate::Sps60,
        "100" => DataRate::Sps100,
        "500" => DataRate::Sps500,
        "1000" => DataRate::Sps1000,
        "2000" => DataRate::Sps2000,
        "3750" => DataRate::Sps3750,
        "7500" => DataRate::Sps7500,
        "15000" => DataRate::Sps15000,
        "30000" => DataRate::Sps30000,
        _ => return None,
    })
}

pub fn parse_mode(token: &str) -> Option<ScanMode> {
    Some(match token {
        "single" => ScanMode::SingleEnded,
        "diff" => ScanMode::Differential,
        _ => return None,
    })
}
