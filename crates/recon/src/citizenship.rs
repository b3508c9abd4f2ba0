use serde::Deserialize;

/// One entry of the host application's citizenship reference list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CitizenshipRef {
    pub id: String,
    pub code: String,
    pub name: String,
}

/// Resolve a recognized citizenship code or name against the reference list.
///
/// Match order: exact code (case-insensitive), then the symmetric `RU`/`RUS`
/// alias, then (for `RU`/`RUS` input only) a Russian-language name
/// substring. No match yields `None`; the engine never guesses.
pub fn resolve(citizenships: &[CitizenshipRef], input: &str) -> Option<String> {
    let code = input.trim();
    if code.is_empty() {
        return None;
    }
    let upper = code.to_uppercase();

    if let Some(c) = find_by_code(citizenships, &upper) {
        return Some(c.id.clone());
    }

    let alias = match upper.as_str() {
        "RU" => "RUS",
        "RUS" => "RU",
        _ => return None,
    };
    if let Some(c) = find_by_code(citizenships, alias) {
        return Some(c.id.clone());
    }

    citizenships
        .iter()
        .find(|c| c.name.to_lowercase().contains("росси"))
        .map(|c| c.id.clone())
}

fn find_by_code<'a>(citizenships: &'a [CitizenshipRef], code: &str) -> Option<&'a CitizenshipRef> {
    citizenships.iter().find(|c| c.code.to_uppercase() == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Vec<CitizenshipRef> {
        vec![
            CitizenshipRef {
                id: "1".into(),
                code: "RUS".into(),
                name: "Российская Федерация".into(),
            },
            CitizenshipRef {
                id: "2".into(),
                code: "UZB".into(),
                name: "Узбекистан".into(),
            },
            CitizenshipRef {
                id: "3".into(),
                code: "TJK".into(),
                name: "Таджикистан".into(),
            },
        ]
    }

    #[test]
    fn exact_code_match() {
        assert_eq!(resolve(&list(), "UZB"), Some("2".into()));
        assert_eq!(resolve(&list(), "uzb"), Some("2".into()));
    }

    #[test]
    fn ru_rus_alias_is_symmetric() {
        assert_eq!(resolve(&list(), "RU"), Some("1".into()));
        let mut short = list();
        short[0].code = "RU".into();
        assert_eq!(resolve(&short, "RUS"), Some("1".into()));
    }

    #[test]
    fn ru_falls_back_to_russian_name() {
        let mut odd = list();
        odd[0].code = "РФ".into();
        assert_eq!(resolve(&odd, "RU"), Some("1".into()));
    }

    #[test]
    fn no_match_never_guesses() {
        assert_eq!(resolve(&list(), "KAZ"), None);
        assert_eq!(resolve(&list(), ""), None);
    }
}
