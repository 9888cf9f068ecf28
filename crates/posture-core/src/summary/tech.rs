use crate::bag::RawScanBag;
use crate::extract::{array_at, first_match, str_at, Strategy};
use serde_json::Value;

pub const MAX_TECHS: usize = 6;

fn urlscan_result(bag: &RawScanBag) -> Option<&Value> {
    bag.urlscan.ok().and_then(|o| o.completed())
}

/// Names from a technology list, `Name` preferred over `Tag`.
fn technology_names(list: &[Value], keys: &[&str]) -> Option<Vec<String>> {
    let names: Vec<String> = list
        .iter()
        .filter_map(|t| keys.iter().find_map(|k| str_at(t, &format!("/{}", k))))
        .take(MAX_TECHS)
        .map(str::to_string)
        .collect();
    (!names.is_empty()).then_some(names)
}

fn wappalyzer(bag: &RawScanBag) -> Option<Vec<String>> {
    let list = array_at(urlscan_result(bag)?, "/meta/processors/wappa/data")?;
    technology_names(list, &["app"])
}

fn builtwith_technologies(bag: &RawScanBag) -> Option<Vec<String>> {
    let list = array_at(bag.builtwith.ok()?, "/Results/0/Result/Technologies")?;
    technology_names(list, &["Name", "Tag"])
}

fn builtwith_paths(bag: &RawScanBag) -> Option<Vec<String>> {
    let list = array_at(bag.builtwith.ok()?, "/Results/0/Result/Paths/0/Technologies")?;
    technology_names(list, &["Name", "Tag"])
}

/// Top technologies, from the first provider that reports any.
pub fn top_techs(bag: &RawScanBag) -> Vec<String> {
    let strategies: [Strategy<RawScanBag, Vec<String>>; 3] = [
        ("urlscan.wappalyzer", wappalyzer),
        ("builtwith.technologies", builtwith_technologies),
        ("builtwith.paths", builtwith_paths),
    ];
    first_match(bag, &strategies).unwrap_or_default()
}

pub fn urlscan_summary(bag: &RawScanBag) -> Option<String> {
    let strategies: [Strategy<Value, String>; 2] = [
        ("page.title", |v| str_at(v, "/page/title").map(String::from)),
        ("task.domain", |v| str_at(v, "/task/domain").map(String::from)),
    ];
    first_match(urlscan_result(bag)?, &strategies)
}

pub fn urlscan_screenshot(bag: &RawScanBag) -> Option<String> {
    let strategies: [Strategy<Value, String>; 2] = [
        ("screenshot", |v| str_at(v, "/screenshot").map(String::from)),
        ("task.screenshotURL", |v| {
            str_at(v, "/task/screenshotURL").map(String::from)
        }),
    ];
    first_match(urlscan_result(bag)?, &strategies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::{AdapterResult, UrlScanOutcome};
    use serde_json::json;

    fn with_urlscan(v: Value) -> RawScanBag {
        RawScanBag {
            urlscan: AdapterResult::Ok(UrlScanOutcome::Completed(v)),
            ..Default::default()
        }
    }

    #[test]
    fn wappalyzer_wins_and_is_capped() {
        let apps: Vec<Value> = (0..8).map(|i| json!({"app": format!("App{}", i)})).collect();
        let mut bag = with_urlscan(json!({"meta": {"processors": {"wappa": {"data": apps}}}}));
        bag.builtwith = AdapterResult::Ok(json!({
            "Results": [{"Result": {"Technologies": [{"Name": "nginx"}]}}]
        }));
        let techs = top_techs(&bag);
        assert_eq!(techs.len(), MAX_TECHS);
        assert_eq!(techs[0], "App0");
    }

    #[test]
    fn builtwith_name_then_tag() {
        let bag = RawScanBag {
            builtwith: AdapterResult::Ok(json!({
                "Results": [{"Result": {"Technologies": [{"Name": "nginx"}, {"Tag": "cdn"}]}}]
            })),
            ..Default::default()
        };
        assert_eq!(top_techs(&bag), vec!["nginx", "cdn"]);
    }

    #[test]
    fn builtwith_paths_fallback() {
        let bag = RawScanBag {
            builtwith: AdapterResult::Ok(json!({
                "Results": [{"Result": {"Paths": [{"Technologies": [{"Name": "WordPress"}]}]}}]
            })),
            ..Default::default()
        };
        assert_eq!(top_techs(&bag), vec!["WordPress"]);
    }

    #[test]
    fn no_provider_yields_empty() {
        assert!(top_techs(&RawScanBag::default()).is_empty());
    }

    #[test]
    fn urlscan_fields_fall_back() {
        let bag = with_urlscan(json!({
            "task": {"domain": "example.com", "screenshotURL": "https://shots/x.png"}
        }));
        assert_eq!(urlscan_summary(&bag).as_deref(), Some("example.com"));
        assert_eq!(urlscan_screenshot(&bag).as_deref(), Some("https://shots/x.png"));

        let pending = RawScanBag {
            urlscan: AdapterResult::Ok(UrlScanOutcome::Pending {
                note: "urlscan job queued, try later".into(),
                job: json!({"uuid": "u"}),
            }),
            ..Default::default()
        };
        assert_eq!(urlscan_summary(&pending), None);
    }
}
