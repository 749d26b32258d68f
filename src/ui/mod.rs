/// UI layer: side-panel filter widgets and the central chart grid.
pub mod panels;
pub mod plot;
