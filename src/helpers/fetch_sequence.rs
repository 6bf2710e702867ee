use crate::repositories::api_error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Hands out increasing tickets so only the newest fetch may land.
///
/// The views call `begin` and `finish` under one `&mut self` that spans the
/// await, so their own fetches never overlap and always land. The ticket
/// check only rejects anything when a caller holds a ticket across a second
/// `begin`, as the tests below do.
#[derive(Debug, Default)]
pub struct FetchSequence {
    issued: u64,
}

impl FetchSequence {
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// A fetched list plus where its last fetch stands.
///
/// Failures keep the previous items. Results carrying an outdated ticket are
/// dropped whether they succeeded or not.
#[derive(Debug)]
pub struct ListState<T> {
    items: Vec<T>,
    state: LoadState,
    sequence: FetchSequence,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
            sequence: FetchSequence::default(),
        }
    }
}

impl<T> ListState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn begin(&mut self) -> FetchTicket {
        self.state = LoadState::Loading;
        self.sequence.begin()
    }

    /// Returns whether the result was applied.
    pub fn finish(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<T>, ApiError>,
    ) -> Result<bool, ApiError> {
        if !self.sequence.is_current(ticket) {
            return Ok(false);
        }

        match result {
            Ok(items) => {
                self.items = items;
                self.state = LoadState::Loaded;
                Ok(true)
            }
            Err(e) => {
                self.state = LoadState::Failed(e.message.clone());
                Err(e)
            }
        }
    }
}
