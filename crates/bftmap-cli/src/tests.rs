use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["bftmap-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn nearby_parses_point_with_defaults() {
    let cli = Cli::try_parse_from(["bftmap-cli", "nearby", "--lat", "35.681", "--lng", "139.767"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Nearby {
            radius: None,
            limit: None,
            integrated: false,
            json: false,
            ..
        })
    ));
}

#[test]
fn nearby_parses_all_flags() {
    let cli = Cli::try_parse_from([
        "bftmap-cli",
        "nearby",
        "--lat",
        "35.6909",
        "--lng",
        "139.7003",
        "--radius",
        "500",
        "--limit",
        "5",
        "--integrated",
        "--json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Nearby {
            limit: Some(5),
            integrated: true,
            json: true,
            radius: Some(r),
            ..
        }) if (r - 500.0).abs() < f64::EPSILON
    ));
}

#[test]
fn nearby_requires_both_coordinates() {
    assert!(Cli::try_parse_from(["bftmap-cli", "nearby", "--lat", "35.68"]).is_err());
}

#[test]
fn classify_by_point() {
    let cli = Cli::try_parse_from(["bftmap-cli", "classify", "--lat", "35.68", "--lng", "139.76"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Classify {
            lat: Some(_),
            lng: Some(_),
            address: None
        })
    ));
}

#[test]
fn classify_by_address() {
    let cli =
        Cli::try_parse_from(["bftmap-cli", "classify", "--address", "東京都 新宿区西新宿2-8-1"])
            .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Classify {
            lat: None,
            address: Some(ref a),
            ..
        }) if a.contains("新宿区")
    ));
}

#[test]
fn classify_needs_a_point_or_an_address() {
    assert!(Cli::try_parse_from(["bftmap-cli", "classify"]).is_err());
    assert!(Cli::try_parse_from(["bftmap-cli", "classify", "--lat", "35.68"]).is_err());
    assert!(Cli::try_parse_from([
        "bftmap-cli",
        "classify",
        "--lat",
        "35.68",
        "--lng",
        "139.76",
        "--address",
        "新宿区"
    ])
    .is_err());
}

#[test]
fn adjacent_takes_area_name() {
    let cli = Cli::try_parse_from(["bftmap-cli", "adjacent", "--area", "世田谷区"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Adjacent { ref area }) if area == "世田谷区"
    ));
}

#[test]
fn adjacent_rejects_unknown_area() {
    assert!(area::run_adjacent("大阪市").is_err());
    assert!(area::run_adjacent("世田谷区").is_ok());
}
