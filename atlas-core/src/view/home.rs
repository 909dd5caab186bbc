//! ``src/view/home.rs``
//! ============================================================================
//! # Home view: the country grid
//!
//! Builds the Home container from the collection and the current filter.
//! Called after every search or region change and after the bulk fetch
//! settles; each call replaces the whole container.

use tracing::{debug, trace};

use crate::{
    error::FetchError,
    model::{
        country::{Country, Region},
        filter::filter,
    },
    view::tree::{CountryCard, Surface, ViewKind, ViewNode, ViewStatus},
};

/// Inputs of one Home render.
#[derive(Debug, Clone, Copy)]
pub struct HomeInput<'a> {
    pub collection: &'a [Country],
    pub query: &'a str,
    pub region: Region,
    pub is_fetching: bool,
    pub error: Option<&'a FetchError>,
}

/// Status the Home view should show for `input`.
///
/// A loaded collection always wins: a failed reload keeps the previous grid.
/// Without one, an outstanding fetch shows loading and a failed one shows
/// the error.
pub fn home_status(input: &HomeInput<'_>, matches: usize) -> ViewStatus {
    if !input.collection.is_empty() {
        if matches == 0 {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        }
    } else if input.is_fetching {
        ViewStatus::Loading
    } else if let Some(err) = input.error {
        ViewStatus::failed(err)
    } else {
        ViewStatus::Idle
    }
}

/// Rebuild the Home container. Returns `false`, leaving the container
/// untouched, when Home is not the visible view.
pub fn render_home(surface: &mut Surface, input: &HomeInput<'_>) -> bool {
    if !surface.is_visible(ViewKind::Home) {
        trace!("Home not visible, render skipped");
        return false;
    }

    let matched = filter(input.collection, input.query, input.region);
    let status = home_status(input, matched.len());
    let nodes = matched
        .into_iter()
        .map(|country| ViewNode::Card(CountryCard::from_country(country)))
        .collect::<Vec<_>>();

    debug!(
        query = input.query,
        region = input.region.as_str(),
        cards = nodes.len(),
        ?status,
        "Home rendered"
    );
    surface.home.replace(status, nodes);
    true
}

/// Narrowest card that still fits its border and a truncated name.
pub const MIN_CARD_WIDTH: u16 = 8;

pub const fn clamp_card_width(card_width: u16) -> u16 {
    if card_width < MIN_CARD_WIDTH {
        MIN_CARD_WIDTH
    } else {
        card_width
    }
}

/// Cards per grid row for an area `width` cells wide.
pub fn grid_columns(width: u16, card_width: u16) -> usize {
    usize::from((width / clamp_card_width(card_width)).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::country::fixtures::country;

    fn input<'a>(collection: &'a [Country], query: &'a str, region: Region) -> HomeInput<'a> {
        HomeInput {
            collection,
            query,
            region,
            is_fetching: false,
            error: None,
        }
    }

    #[test]
    fn test_status_is_exclusive() {
        let empty: Vec<Country> = Vec::new();
        let err = FetchError::status("/all", 500);

        let loading = HomeInput {
            is_fetching: true,
            ..input(&empty, "", Region::All)
        };
        assert_eq!(home_status(&loading, 0), ViewStatus::Loading);

        let failed = HomeInput {
            error: Some(&err),
            ..input(&empty, "", Region::All)
        };
        assert!(home_status(&failed, 0).is_failed());

        let world = vec![country("KEN", "Kenya", "Africa")];
        let no_match = HomeInput {
            error: Some(&err),
            ..input(&world, "zzz", Region::Africa)
        };
        assert_eq!(home_status(&no_match, 0), ViewStatus::Empty);
    }

    #[test]
    fn test_render_replaces_cards() {
        let world = vec![
            country("KEN", "Kenya", "Africa"),
            country("FRA", "France", "Europe"),
        ];
        let mut surface = Surface::default();

        assert!(render_home(&mut surface, &input(&world, "", Region::All)));
        assert_eq!(surface.home.target_count(), 2);

        assert!(render_home(&mut surface, &input(&world, "", Region::Africa)));
        assert_eq!(surface.home.target_count(), 1);
        assert_eq!(surface.home.status(), &ViewStatus::Ready);
        match &surface.home.nodes()[0] {
            ViewNode::Card(card) => {
                assert_eq!(card.name, "Kenya");
                assert_eq!(card.population, "1,000");
                assert_eq!(card.capital, "N/A");
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_render_skipped_when_hidden() {
        let world = vec![country("KEN", "Kenya", "Africa")];
        let mut surface = Surface::default();
        surface.show(ViewKind::Detail);

        assert!(!render_home(&mut surface, &input(&world, "", Region::All)));
        assert_eq!(surface.home.renders(), 0);
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(100, 32), 3);
        assert_eq!(grid_columns(10, 32), 1);
        // narrower than a card can paint
        assert_eq!(grid_columns(100, 0), 12);
        assert_eq!(grid_columns(100, 3), grid_columns(100, MIN_CARD_WIDTH));
    }
}
