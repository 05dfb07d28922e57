//! Collections that exist only on this client.
//!
//! Vouchers, FAQs and support tickets have no backend endpoints. Their
//! screens work on a seeded in-memory list; records created here get a
//! negative temporary id that is never reused.

use gearhub_core::TemporaryIds;
use gearhub_core::TicketStatus;
use gearhub_core::models::{Keyed, SupportTicket};

/// In-memory list of keyed records.
#[derive(Debug)]
pub struct LocalCollection<T> {
    items: Vec<T>,
    ids: TemporaryIds,
}

impl<T: Keyed + Clone> LocalCollection<T> {
    #[must_use]
    pub fn new(seed: Vec<T>) -> Self {
        Self {
            items: seed,
            ids: TemporaryIds::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Add a record under a fresh temporary id, returning that id.
    pub fn insert(&mut self, mut item: T) -> T::Id {
        let id: T::Id = self.ids.allocate();
        item.set_id(id);
        self.items.push(item);
        id
    }

    /// Edit a record in place. Returns `false` if no record has `id`.
    pub fn update<F: FnOnce(&mut T)>(&mut self, id: T::Id, edit: F) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                edit(item);
                true
            }
            None => false,
        }
    }

    /// Remove a record, returning it.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl LocalCollection<SupportTicket> {
    /// Move a ticket to `status`.
    pub fn set_status(&mut self, id: gearhub_core::TicketId, status: TicketStatus) -> bool {
        self.update(id, |ticket| ticket.status = status)
    }

    /// Append a staff response. An open ticket moves to in-progress.
    pub fn respond(&mut self, id: gearhub_core::TicketId, response: &str) -> bool {
        self.update(id, |ticket| {
            ticket.responses.push(response.to_string());
            if ticket.status == TicketStatus::Open {
                ticket.status = TicketStatus::InProgress;
            }
        })
    }
}
