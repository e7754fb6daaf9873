/// Whether we believe the price service is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Online,
    Offline,
}

/// What a connectivity input did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed and no indicator work is needed.
    Unchanged,
    /// Offline → Online. Caller shows the price appearance.
    WentOnline,
    /// Now Offline (freshly or again). Caller shows the offline appearance.
    Offline,
}

impl Transition {
    pub fn needs_offline_appearance(self) -> bool {
        self == Self::Offline
    }
}

/// Online/offline state machine.
///
/// Starts Offline. Only a successful fetch brings it Online. Online is sticky
/// across failed fetches; only a disconnect event takes it back Offline.
#[derive(Debug)]
pub struct ConnectivityState {
    link: Link,
}

impl ConnectivityState {
    pub fn new() -> Self {
        Self { link: Link::Offline }
    }

    pub fn link(&self) -> Link {
        self.link
    }

    /// A 2xx response with a usable price arrived.
    pub fn on_fetch_success(&mut self) -> Transition {
        match self.link {
            Link::Offline => {
                self.link = Link::Online;
                Transition::WentOnline
            }
            Link::Online => Transition::Unchanged,
        }
    }

    /// Timeout, transport error or non-2xx status.
    pub fn on_fetch_failure(&mut self) -> Transition {
        match self.link {
            // A single bad fetch while healthy is not worth flapping the LED.
            Link::Online => Transition::Unchanged,
            Link::Offline => Transition::Offline,
        }
    }

    /// Any layer reported a disconnect.
    pub fn on_disconnect(&mut self) -> Transition {
        self.link = Link::Offline;
        Transition::Offline
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_offline() {
        let c = ConnectivityState::new();
        assert_eq!(c.link(), Link::Offline);
        assert_ne!(c.link(), Link::Online);
    }

    #[test]
    fn success_brings_online_once() {
        let mut c = ConnectivityState::new();
        assert_eq!(c.on_fetch_success(), Transition::WentOnline);
        assert_eq!(c.link(), Link::Online);
        assert_eq!(c.on_fetch_success(), Transition::Unchanged);
    }

    #[test]
    fn failure_while_online_is_sticky() {
        let mut c = ConnectivityState::new();
        c.on_fetch_success();
        for _ in 0..5 {
            assert_eq!(c.on_fetch_failure(), Transition::Unchanged);
        }
        assert_eq!(c.link(), Link::Online);
    }

    #[test]
    fn failure_while_offline_reapplies() {
        let mut c = ConnectivityState::new();
        let t = c.on_fetch_failure();
        assert!(t.needs_offline_appearance());
        assert_eq!(c.link(), Link::Offline);
        assert!(c.on_fetch_failure().needs_offline_appearance());
    }

    #[test]
    fn disconnect_forces_offline_from_any_state() {
        let mut c = ConnectivityState::new();
        assert_eq!(c.on_disconnect(), Transition::Offline);
        c.on_fetch_success();
        assert_eq!(c.on_disconnect(), Transition::Offline);
        assert_eq!(c.link(), Link::Offline);
    }
}
