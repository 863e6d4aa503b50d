//! Search → confirm → recommend flow for interactive hosts.
//!
//! The engine functions are stateless. This state machine holds what the
//! host needs between prompts: the catalog row under confirmation, or the
//! confirmed one. It never holds scores.

use log::debug;
use thiserror::Error;

use crate::error::MatchError;
use crate::matcher::match_query;
use crate::models::{Catalog, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Catalog index of the match waiting for a yes/no.
    AwaitingConfirmation(usize),
    /// Catalog index of the track to recommend from.
    Confirmed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Cannot {event} while {state:?}")]
    InvalidTransition {
        event: &'static str,
        state: SessionState,
    },
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Match a query. Valid in any state; a failed search returns to Idle.
    pub fn search<'a>(
        &mut self,
        query: &str,
        catalog: &'a Catalog,
    ) -> Result<&'a Track, SessionError> {
        self.state = SessionState::Idle;

        let track = match_query(query, catalog)?;
        if let Some(idx) = catalog.position_of(track) {
            debug!("Awaiting confirmation of row {}", idx);
            self.state = SessionState::AwaitingConfirmation(idx);
        }
        Ok(track)
    }

    pub fn confirm(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::AwaitingConfirmation(idx) => {
                self.state = SessionState::Confirmed(idx);
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                event: "confirm",
                state,
            }),
        }
    }

    pub fn reject(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::AwaitingConfirmation(_) => {
                self.state = SessionState::Idle;
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                event: "reject",
                state,
            }),
        }
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Track awaiting confirmation, if any.
    pub fn pending_track<'a>(&self, catalog: &'a Catalog) -> Option<&'a Track> {
        match self.state {
            SessionState::AwaitingConfirmation(idx) => catalog.get(idx),
            _ => None,
        }
    }

    /// Confirmed track, if any.
    pub fn confirmed_track<'a>(&self, catalog: &'a Catalog) -> Option<&'a Track> {
        match self.state {
            SessionState::Confirmed(idx) => catalog.get(idx),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_catalog_from_reader;

    fn catalog() -> Catalog {
        let data = "track_name,track_artist,track_popularity,playlist_genre,danceability,energy,tempo,valence,acousticness,instrumentalness\n\
                    Blinding Lights,The Weeknd,90,pop,0.5,0.7,171,0.3,0.0,0.0\n\
                    Bad Guy,Billie Eilish,85,pop,0.7,0.4,135,0.5,0.3,0.1\n";
        load_catalog_from_reader(data.as_bytes()).unwrap().0
    }

    #[test]
    fn test_search_confirm_flow() {
        let c = catalog();
        let mut s = Session::new();
        assert_eq!(s.state(), SessionState::Idle);

        let track = s.search("blinding light", &c).unwrap();
        assert_eq!(track.name, "Blinding Lights");
        assert_eq!(s.state(), SessionState::AwaitingConfirmation(0));
        assert_eq!(s.pending_track(&c).unwrap().name, "Blinding Lights");
        assert!(s.confirmed_track(&c).is_none());

        s.confirm().unwrap();
        assert_eq!(s.state(), SessionState::Confirmed(0));
        assert_eq!(s.confirmed_track(&c).unwrap().artist, "The Weeknd");

        s.reset();
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_reject_returns_to_idle() {
        let c = catalog();
        let mut s = Session::new();
        s.search("Bad Guy", &c).unwrap();
        s.reject().unwrap();
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_blank_and_unmatched_searches() {
        let c = catalog();
        let mut s = Session::new();
        assert_eq!(
            s.search("   ", &c).unwrap_err(),
            SessionError::Match(MatchError::EmptyInput)
        );
        assert!(matches!(
            s.search("qqqqqqqqqq", &c),
            Err(SessionError::Match(MatchError::NoMatchFound(_)))
        ));
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_failed_search_clears_confirmation() {
        let c = catalog();
        let mut s = Session::new();
        s.search("Bad Guy", &c).unwrap();
        s.confirm().unwrap();
        assert!(s.search("", &c).is_err());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_invalid_transitions_keep_state() {
        let c = catalog();
        let mut s = Session::new();
        assert!(matches!(
            s.confirm(),
            Err(SessionError::InvalidTransition { event: "confirm", .. })
        ));
        assert!(s.reject().is_err());
        assert_eq!(s.state(), SessionState::Idle);

        s.search("Bad Guy", &c).unwrap();
        s.confirm().unwrap();
        assert!(s.reject().is_err());
        assert_eq!(s.state(), SessionState::Confirmed(1));
    }
}
