//! Navigator for headless use.

use tracing::info;

use crate::domain::Route;
use crate::ports::outbound::Navigator;

/// Navigator that only logs the requested route.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!(?route, "[feed-sync] Navigation requested");
    }
}
