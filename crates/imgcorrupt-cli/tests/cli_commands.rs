//! File-level tests for the apply and verify commands.

use std::fs;

use imgcorrupt::{apply_fog, Corruption, Image, RandomState};
use imgcorrupt_cli::commands::apply::{corrupt_image, ApplyMode};
use imgcorrupt_cli::commands::verify::check;
use imgcorrupt_cli::io::{digest, encode_png, load_image, write_png, PngConfig};
use pretty_assertions::assert_eq;

#[test]
fn test_apply_direct_writes_reproducible_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("card.png");
    write_png(&Image::test_card(24, 24), &input, &PngConfig::default()).unwrap();

    let mode = ApplyMode::Direct {
        corruption: "fog".to_string(),
        severity: 3,
        seed: 5,
    };
    let mut digests = Vec::new();
    for name in ["a.png", "b.png"] {
        let output = dir.path().join(name);
        let status = imgcorrupt_cli::commands::apply::run(
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            &mode,
            true,
        );
        assert!(status.is_ok());
        digests.push(digest(&fs::read(&output).unwrap()));
    }
    assert_eq!(digests[0], digests[1]);

    let written = load_image(&dir.path().join("a.png")).unwrap();
    let expected = apply_fog(&Image::test_card(24, 24), 3, 5).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn test_apply_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aug.json");
    fs::write(
        &config,
        r#"{"corruption": "shot_noise", "severity": 2, "seed": 1, "name": "shot"}"#,
    )
    .unwrap();

    let card = Image::test_card(16, 16);
    let mode = ApplyMode::Config {
        path: config.to_str().unwrap().to_string(),
    };
    let out = corrupt_image(&card, &mode).unwrap();

    let seed = RandomState::new(1).derive_seed();
    assert_eq!(out, Corruption::ShotNoise.apply(&card, 2, seed).unwrap());
}

#[test]
fn test_apply_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.json");
    fs::write(&config, r#"{"corruption": "rain"}"#).unwrap();
    let mode = ApplyMode::Config {
        path: config.to_str().unwrap().to_string(),
    };
    assert!(corrupt_image(&Image::test_card(8, 8), &mode).is_err());
}

#[test]
fn test_verify_every_corruption() {
    for c in Corruption::ALL {
        let report = check(c.name(), 3, 1).unwrap();
        assert!(report.contract_holds, "{} broke its contract", c);
    }
}

#[test]
fn test_verify_digest_matches_png_bytes() {
    let report = check("contrast", 2, 0).unwrap();
    let out = Corruption::Contrast
        .apply(&Image::test_card(32, 32), 2, 0)
        .unwrap();
    let bytes = encode_png(&out, &PngConfig::default()).unwrap();
    assert_eq!(report.digest, digest(&bytes));
}
