use folio_engine::*;

const TOUR_JSON: &str = include_str!("../data/tour.json");

/// The portfolio page: one hero, five content sections and a guided tour.
#[derive(Debug, Default)]
pub struct PortfolioPage;

impl PortfolioPage {
    /// Load the bundled tour.
    pub fn load_tour() -> Result<TourManifest, FolioError> {
        TourManifest::from_json(TOUR_JSON)
    }
}

impl Page for PortfolioPage {
    fn tour_steps(&self) -> Vec<TourStep> {
        match Self::load_tour() {
            Ok(manifest) => manifest.steps,
            Err(err) => {
                log::error!("portfolio: {err}, tour disabled");
                Vec::new()
            }
        }
    }
}
