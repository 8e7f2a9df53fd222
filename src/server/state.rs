use crate::languages::LanguageRegistry;
use crate::settings;

#[derive(Debug, Clone)]
pub struct ServerState {
    pub(crate) settings: settings::Settings,
    pub(crate) registry: LanguageRegistry,
}

impl ServerState {
    pub fn new(settings: settings::Settings) -> Self {
        let registry = LanguageRegistry::new(&settings.language_aliases);
        Self { settings, registry }
    }
}
