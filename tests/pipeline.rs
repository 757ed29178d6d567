use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;

use chrono::Datelike;

use auto_edge::config::ApiConfig;
use auto_edge::pipeline::{Alliance, compute_win_probability};
use auto_edge::prob_model::{ModelConfig, sample_std_dev};
use auto_edge::variance::auto_std_dev;

/// Minimal one-request-at-a-time HTTP stub: routes on the request path and
/// answers with canned JSON. Good enough for the pipeline's plain GETs.
fn spawn_stub(handler: impl Fn(&str) -> (u16, String) + Send + Sync + 'static) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                match stream.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            let request = String::from_utf8_lossy(&buf);
            let path = request
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("/")
                .to_string();
            let (status, body) = handler(&path);
            let reason = if status == 200 { "OK" } else { "Not Found" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}

fn stub_config(base: &str) -> ApiConfig {
    ApiConfig {
        statbotics_base: base.to_string(),
        tba_base: base.to_string(),
        tba_auth_key: "test-key".to_string(),
    }
}

fn team_year_body(team: u32, year: i32, auto: f64) -> String {
    format!(r#"{{"team":{team},"year":{year},"epa":{{"breakdown":{{"auto_points":{auto}}}}}}}"#)
}

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn full_pipeline_with_partial_data() {
    let year = chrono::Utc::now().year();
    let base = spawn_stub(move |path| {
        if let Some(rest) = path.strip_prefix("/team_year/") {
            let mut parts = rest.split('/');
            let team: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let y: i32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let auto = match (team, y == year) {
                (254, true) => Some(20.0),
                (11, true) => Some(2.0),
                // Published last season only: exercises the year-back fallback.
                (12, false) => Some(2.0),
                (13, true) => Some(2.0),
                (21, true) => Some(1.0),
                (23, true) => Some(2.0),
                _ => None,
            };
            return match auto {
                Some(v) => (200, team_year_body(team, y, v)),
                None => (404, r#"{"detail":"Not Found"}"#.to_string()),
            };
        }
        if path.starts_with("/team/") {
            return (200, "[]".to_string());
        }
        (404, String::new())
    });

    let cfg = stub_config(&base);
    let model = ModelConfig::default();
    let mut log = Vec::new();
    let result = compute_win_probability(
        &cfg,
        &model,
        Alliance::red([11, 12, 13]),
        Alliance::blue([21, 22, 23]),
        None,
        &mut |line| log.push(line.to_string()),
    )
    .expect("both alliances have ratings");

    assert_eq!(result.red_total, 6.0);
    // Team 22 resolved nothing and is excluded, not zeroed.
    assert_eq!(result.blue_total, 3.0);
    // z = (6 - 3) / 10 with the fallback SD.
    assert!((result.p_red - 0.6179).abs() < 1e-3);
    assert!((result.p_blue - 0.3821).abs() < 1e-3);

    let expected = vec![
        format!("Using {year} EPA data"),
        "Team 11 auto EPA: 2.00".to_string(),
        format!("Team 12 auto EPA: 2.00 (from {})", year - 1),
        "Team 13 auto EPA: 2.00".to_string(),
        "Team 21 auto EPA: 1.00".to_string(),
        "Team 22: no EPA found".to_string(),
        "Team 23 auto EPA: 2.00".to_string(),
        "Red alliance auto EPA: 6.00".to_string(),
        "Blue alliance auto EPA: 3.00".to_string(),
        "Team 11: no match variance data".to_string(),
        "Team 12: no match variance data".to_string(),
        "Team 13: no match variance data".to_string(),
        "Team 21: no match variance data".to_string(),
        "Team 22: no match variance data".to_string(),
        "Team 23: no match variance data".to_string(),
        "Using fallback sd = 10".to_string(),
    ];
    assert_eq!(log, expected);
}

#[test]
fn empty_alliance_aborts_with_absence() {
    let year = chrono::Utc::now().year();
    let base = spawn_stub(move |path| {
        if let Some(rest) = path.strip_prefix("/team_year/") {
            let team: u32 = rest
                .split('/')
                .next()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            // Only the red side and the season canary have data.
            if matches!(team, 254 | 11 | 12 | 13) {
                return (200, team_year_body(team, year, 5.0));
            }
            return (404, r#"{"detail":"Not Found"}"#.to_string());
        }
        (404, String::new())
    });

    let cfg = stub_config(&base);
    let model = ModelConfig::default();
    let mut log = Vec::new();
    let result = compute_win_probability(
        &cfg,
        &model,
        Alliance::red([11, 12, 13]),
        Alliance::blue([91, 92, 93]),
        None,
        &mut |line| log.push(line.to_string()),
    );

    assert!(result.is_none());
    assert!(log.contains(&"Team 91: no EPA found".to_string()));
    // The pipeline stops before totals are ever logged.
    assert!(!log.iter().any(|l| l.contains("alliance auto EPA")));
}

#[test]
fn variance_prefers_event_matches() {
    let event_body = read_fixture("event_matches.json");
    let base = spawn_stub(move |path| {
        if path == "/event/2024casj/matches" {
            return (200, event_body.clone());
        }
        if path.starts_with("/team/") {
            return (200, "[]".to_string());
        }
        (404, String::new())
    });

    let cfg = stub_config(&base);
    let model = ModelConfig::default();

    // Three event scores: a real sample SD, sourced from the event tier.
    let est = auto_std_dev(&cfg, &model, 604, Some("2024casj"), 2024);
    assert_eq!(est.sd, Some(sample_std_dev(&[10.0, 7.0, 8.0])));
    assert_eq!(est.source, "event (3 matches)");
    assert_eq!(est.notes, vec!["Team 604 event matches found: 3".to_string()]);

    // Two event scores: the low-confidence proxy on the first score.
    let est = auto_std_dev(&cfg, &model, 254, Some("2024casj"), 2024);
    assert_eq!(est.sd, Some(10.0 * model.two_sample_proxy));
    assert_eq!(est.source, "event (2 matches)");

    // No event appearances and no season matches: explicit absence.
    let est = auto_std_dev(&cfg, &model, 9999, Some("2024casj"), 2024);
    assert_eq!(est.sd, None);
    assert_eq!(est.source, "no data");
}
