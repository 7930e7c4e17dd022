use std::sync::Arc;

use crate::scanner::Scanner;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
}
