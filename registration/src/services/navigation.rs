use serde::{Deserialize, Serialize};

/// State handed over to the destination page once the account is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub registration: bool,
    pub provider: Option<String>,
}

impl NavigationState {
    pub fn registered(provider: Option<String>) -> Self {
        Self {
            registration: true,
            provider,
        }
    }
}

/// Client side router.
pub trait Navigator {
    fn navigate(&mut self, path: &str, state: Option<NavigationState>);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn navigate(&mut self, path: &str, state: Option<NavigationState>) {
        (**self).navigate(path, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_serialization() {
        assert_eq!(
            serde_json::to_value(NavigationState::registered(Some("google".to_string()))).unwrap(),
            json!({"registration": true, "provider": "google"})
        );
        assert_eq!(
            serde_json::to_value(NavigationState::registered(None)).unwrap(),
            json!({"registration": true, "provider": null})
        );
    }
}
