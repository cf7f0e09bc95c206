use wasm_bindgen::prelude::*;

mod page;
use page::PortfolioPage;

folio_web::export_page!(PortfolioPage, "portfolio");
