//! ``src/view/detail.rs``
//! ============================================================================
//! # Detail view: one country

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    error::FetchError,
    model::country::{Country, CountryCode, NOT_AVAILABLE},
    util::humanize::format_population,
    view::tree::{Activation, Surface, ViewNode, ViewStatus},
};

pub const BACK_LABEL: &str = "← Back";

/// Everything the detail page shows, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryDetail {
    pub code: CountryCode,
    pub name: String,
    pub flag: String,
    pub flag_alt: Option<String>,
    pub flag_url: Option<String>,
    pub native_name: String,
    pub population: String,
    pub region: String,
    pub subregion: String,
    pub capital: String,
    pub tld: String,
    pub currencies: String,
    pub languages: String,
    /// Border codes with resolved names, in the order the API listed them.
    pub borders: Vec<(CountryCode, String)>,
}

impl CountryDetail {
    /// Derive display values. `border_names` fills in labels; a code it
    /// lacks is shown as itself.
    pub fn new(country: &Country, border_names: &IndexMap<CountryCode, String>) -> Self {
        let borders = country
            .borders
            .iter()
            .map(|code| {
                let label = border_names
                    .get(code)
                    .cloned()
                    .unwrap_or_else(|| code.to_string());
                (code.clone(), label)
            })
            .collect();

        Self {
            code: country.code.clone(),
            name: country.name.common.clone(),
            flag: country.flag.clone().unwrap_or_default(),
            flag_alt: country.flags.alt.clone(),
            flag_url: country.flag_url().map(str::to_string),
            native_name: country.native_name().to_string(),
            population: format_population(country.population),
            region: if country.region.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                country.region.clone()
            },
            subregion: country.subregion_label().to_string(),
            capital: country.capital_label().to_string(),
            tld: country.tld_label().to_string(),
            currencies: country.currencies_label(),
            languages: country.languages_label(),
            borders,
        }
    }

    pub fn into_nodes(self) -> Vec<ViewNode> {
        let mut nodes = vec![
            ViewNode::link(BACK_LABEL, Activation::GoHome),
            ViewNode::Heading(format!("{} {}", self.flag, self.name).trim().to_string()),
            ViewNode::field("Native Name", self.native_name),
            ViewNode::field("Population", self.population),
            ViewNode::field("Region", self.region),
            ViewNode::field("Sub Region", self.subregion),
            ViewNode::field("Capital", self.capital),
            ViewNode::field("Top Level Domain", self.tld),
            ViewNode::field("Currencies", self.currencies),
            ViewNode::field("Languages", self.languages),
        ];
        if let Some(url) = self.flag_url {
            let flag = match self.flag_alt {
                Some(alt) if !alt.is_empty() => format!("{url} ({alt})"),
                _ => url,
            };
            nodes.push(ViewNode::field("Flag", flag));
        }

        if self.borders.is_empty() {
            nodes.push(ViewNode::field("Border Countries", NOT_AVAILABLE));
        } else {
            nodes.push(ViewNode::Heading("Border Countries".to_string()));
            nodes.extend(
                self.borders
                    .into_iter()
                    .map(|(code, label)| ViewNode::link(label, Activation::ShowCountry(code))),
            );
        }
        nodes
    }
}

/// Start of a detail request cycle: clears whatever the last country left.
pub fn render_loading(surface: &mut Surface) {
    surface.detail.reset(ViewStatus::Loading);
}

pub fn render_country(
    surface: &mut Surface,
    country: &Country,
    border_names: &IndexMap<CountryCode, String>,
) {
    let nodes = CountryDetail::new(country, border_names).into_nodes();
    debug!(code = %country.code, nodes = nodes.len(), "Detail rendered");
    surface.detail.replace(ViewStatus::Ready, nodes);
}

/// Failure keeps the back button so the user is never stranded.
pub fn render_error(surface: &mut Surface, code: &CountryCode, err: &FetchError) {
    debug!(%code, error = %err, "Detail failed");
    surface.detail.replace(
        ViewStatus::failed(err),
        vec![ViewNode::link(BACK_LABEL, Activation::GoHome)],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::country::{Currency, NativeName, fixtures::country};
    use smallvec::smallvec;

    fn belgium() -> Country {
        let mut c = country("BEL", "Belgium", "Europe");
        c.population = 11_555_997;
        c.subregion = Some("Western Europe".into());
        c.capital = smallvec!["Brussels".to_string()];
        c.tld = smallvec![".be".to_string()];
        c.name.native_name.insert(
            "deu".into(),
            NativeName {
                official: "Königreich Belgien".into(),
                common: "Belgien".into(),
            },
        );
        c.currencies.insert(
            "EUR".into(),
            Currency {
                name: "Euro".into(),
                symbol: Some("€".into()),
            },
        );
        c.languages.insert("deu".into(), "German".into());
        c.languages.insert("fra".into(), "French".into());
        c.borders = smallvec![CountryCode::from("FRA"), CountryCode::from("XXX")];
        c
    }

    #[test]
    fn test_derived_fields() {
        let mut names = IndexMap::new();
        names.insert(CountryCode::from("FRA"), "France".to_string());

        let detail = CountryDetail::new(&belgium(), &names);
        assert_eq!(detail.native_name, "Belgien");
        assert_eq!(detail.population, "11,555,997");
        assert_eq!(detail.capital, "Brussels");
        assert_eq!(detail.tld, ".be");
        assert_eq!(detail.currencies, "Euro");
        assert_eq!(detail.languages, "German, French");
        assert_eq!(
            detail.borders,
            vec![
                (CountryCode::from("FRA"), "France".to_string()),
                (CountryCode::from("XXX"), "XXX".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_fields_render_na() {
        let bare = country("ATA", "Antarctica", "Antarctic");
        let detail = CountryDetail::new(&bare, &IndexMap::new());
        assert_eq!(detail.native_name, "Antarctica");
        assert_eq!(detail.subregion, "N/A");
        assert_eq!(detail.capital, "N/A");
        assert_eq!(detail.currencies, "N/A");
        assert_eq!(detail.languages, "N/A");

        let nodes = detail.into_nodes();
        assert!(nodes.contains(&ViewNode::field("Border Countries", "N/A")));
    }

    #[test]
    fn test_border_links_in_order() {
        let mut surface = Surface::default();
        render_country(&mut surface, &belgium(), &IndexMap::new());

        let targets: Vec<_> = surface
            .detail
            .targets()
            .filter_map(ViewNode::activation)
            .collect();
        assert_eq!(
            targets,
            vec![
                Activation::GoHome,
                Activation::ShowCountry(CountryCode::from("FRA")),
                Activation::ShowCountry(CountryCode::from("XXX")),
            ]
        );
    }

    #[test]
    fn test_error_replaces_loading() {
        let mut surface = Surface::default();
        render_loading(&mut surface);
        assert!(surface.detail.status().is_loading());

        render_error(
            &mut surface,
            &CountryCode::from("ZZZ"),
            &FetchError::status("/alpha/ZZZ", 404),
        );
        assert!(surface.detail.status().is_failed());
        assert!(!surface.detail.status().is_loading());
    }
}
