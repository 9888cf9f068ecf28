#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use posture_core::{AdapterResult, CrtShData, HomePage, RawScanBag, SslJob};
use serde_json::{json, Value};

/// Fixed evaluation instant for deterministic summaries.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn home(headers: &[(&str, &str)]) -> HomePage {
    HomePage {
        status: 200,
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        generator: None,
        detected_libs: Some(vec![]),
    }
}

pub fn ssl_job(v: Value) -> SslJob {
    serde_json::from_value(v).unwrap()
}

/// A READY job with a single endpoint whose certificate expires `days` after
/// [`now`].
pub fn ssl_job_expiring_in(days: i64, grade: &str) -> SslJob {
    let not_after = (now() + Duration::days(days)).timestamp_millis();
    ssl_job(json!({
        "host": "example.com",
        "status": "READY",
        "endpoints": [{
            "ipAddress": "93.184.216.34",
            "grade": grade,
            "details": {
                "protocols": [{"name": "TLS", "version": "1.2"}, {"name": "TLS", "version": "1.3"}],
                "certChains": [{"issuerLabel": "R3", "notAfter": not_after}],
                "suites": [{"list": [
                    {"name": "TLS_AES_128_GCM_SHA256", "cipherStrength": 128},
                    {"name": "TLS_AES_256_GCM_SHA384", "cipherStrength": 256}
                ]}]
            }
        }]
    }))
}

pub fn bag() -> RawScanBag {
    RawScanBag {
        domain: "example.com".to_string(),
        url: "https://example.com/".to_string(),
        ..Default::default()
    }
}

pub fn bag_with_subdomains(n: usize) -> RawScanBag {
    RawScanBag {
        crtsh: AdapterResult::Ok(CrtShData {
            subdomains: (0..n).map(|i| format!("s{}.example.com", i)).collect(),
        }),
        ..bag()
    }
}

/// A fully populated bag with secure defaults.
pub fn healthy_bag() -> RawScanBag {
    RawScanBag {
        home: AdapterResult::Ok(home(&[
            ("strict-transport-security", "max-age=63072000; includeSubDomains"),
            ("content-security-policy", "default-src 'self'"),
            ("x-frame-options", "DENY"),
            ("x-content-type-options", "nosniff"),
            ("referrer-policy", "no-referrer"),
            ("permissions-policy", "geolocation=()"),
            ("server", "nginx"),
        ])),
        robots: AdapterResult::Ok("User-agent: *\nDisallow:\n".to_string()),
        ssl: AdapterResult::Ok(ssl_job_expiring_in(200, "B")),
        ..bag_with_subdomains(2)
    }
}
