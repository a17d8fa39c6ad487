use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Identifies a registered handler so it can be disconnected later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Handlers registered for one notification type.
pub(crate) struct Handlers<F: ?Sized> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(HandlerId, Rc<F>)>>,
}

impl<F: ?Sized> Handlers<F> {
    pub(crate) fn new() -> Self {
        Handlers {
            next_id: Cell::new(0),
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn connect(&self, handler: Rc<F>) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    pub(crate) fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Copies the current handlers out so they can run while others (dis)connect.
    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    }
}
