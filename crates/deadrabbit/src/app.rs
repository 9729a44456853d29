#![forbid(unsafe_code)]

//! The dashboard application: store, layout and backend wired together.
//!
//! [`Dashboard`] implements [`Application`], so [`run_event_loop`] can
//! drive it. Key events become actions through the layout's bindings; every
//! store broadcast redraws the whole frame and presents it.
//!
//! [`run_event_loop`]: rtui_runtime::run_event_loop

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::Receiver;
use rtui_core::event::{Event, KeyEvent};
use rtui_render::frame::Frame;
use rtui_runtime::{Application, Backend, Store, StoreOptions, Unsubscribe, Updates};
use rtui_widgets::{BindingContext, Layout};

use crate::action::Action;
use crate::broker::Broker;
use crate::database::Repositories;
use crate::reducer::{DomainReducer, LayoutReducer, input_reducer};
use crate::state::State;
use crate::views::{
    self, CONTROLS, ControlsView, MESSAGE_DETAILS, MESSAGES_LIST, MessageDetailsView, MessageListView,
};

/// The external systems the dashboard talks to.
pub struct Services {
    pub broker: Box<dyn Broker>,
    pub repositories: Repositories,
}

/// A running dashboard drawing to `B`.
pub struct Dashboard<B: Backend> {
    store: Store<State, Action>,
    layout: Rc<RefCell<Layout<State, Action>>>,
    backend: B,
    updates: Updates<State>,
    _subscription: Unsubscribe<State>,
    quit: bool,
}

impl<B: Backend> Dashboard<B> {
    /// Build the store and the view registry, then focus the message list.
    ///
    /// The initial focus dispatch queues one snapshot on [`Self::updates`],
    /// so the first loop iteration draws the screen.
    pub fn new(initial: State, services: Services, backend: B) -> std::io::Result<Self> {
        let screen = backend.size()?;
        let store: Store<State, Action> = Store::new(initial.clone(), StoreOptions { debug: initial.debug });
        let (updates, subscription) = store.subscribe();

        let layout = Rc::new(RefCell::new(Layout::new(screen)));
        {
            let mut layout = layout.borrow_mut();
            layout.set_global_bindings(views::global_bindings());
            layout.insert(views::list_descriptor(Rc::new(MessageListView::new(MESSAGES_LIST)), false));
            layout.insert(views::details_descriptor(
                Rc::new(MessageDetailsView::new(MESSAGE_DETAILS)),
                false,
            ));
            layout.insert(views::controls_descriptor(Rc::new(ControlsView::new(CONTROLS))));
        }

        let mut domain = DomainReducer::new(services.broker, services.repositories);
        store.add_reducer(move |state, action| domain.reduce(state, action));
        store.add_reducer(input_reducer);
        let mut layout_reducer = LayoutReducer::new(Rc::clone(&layout), store.downgrade());
        store.add_reducer(move |state, action| layout_reducer.reduce(state, action));

        tracing::info!(width = screen.width, height = screen.height, "dashboard ready");
        store.dispatch(Action::FocusView(MESSAGES_LIST.to_string()));

        Ok(Self {
            store,
            layout,
            backend,
            updates,
            _subscription: subscription,
            quit: false,
        })
    }

    pub fn store(&self) -> &Store<State, Action> {
        &self.store
    }

    pub fn layout(&self) -> &Rc<RefCell<Layout<State, Action>>> {
        &self.layout
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Snapshots broadcast by the store, one per dispatch or refresh.
    pub fn updates(&self) -> &Receiver<State> {
        &self.updates
    }

    /// Draw every pending snapshot. Tests call this instead of running the
    /// event loop.
    pub fn drain_updates(&mut self) {
        while let Ok(state) = self.updates.try_recv() {
            self.handle_update(state);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let state = self.store.current();
        if state.input_mode()
            && let Some(c) = key.text_char()
        {
            self.store.dispatch(Action::Input(c));
            return;
        }

        // Release the registry before the handler dispatches into it.
        let found = self.layout.borrow().find_binding(&key, state.focus.top());
        match found {
            Some((binding, view_size)) => {
                tracing::debug!(binding = binding.label(), "key binding matched");
                let ctx = BindingContext {
                    store: self.store.clone(),
                    view_size,
                };
                binding.invoke(&key, &ctx);
            }
            None => tracing::trace!(?key, "unbound key"),
        }
    }
}

impl<B: Backend> Application for Dashboard<B> {
    type State = State;

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize { width, height } => {
                self.layout
                    .borrow_mut()
                    .set_screen_size(rtui_core::geometry::Size::new(width, height));
                self.store.refresh();
            }
        }
    }

    fn handle_update(&mut self, state: State) {
        let screen = self.layout.borrow().screen_size();
        let mut frame = Frame::new(screen.width, screen.height);
        self.layout.borrow().render(&state, &mut frame);
        if let Err(err) = self.backend.present(&frame) {
            tracing::error!(%err, "failed to present frame");
        }
        self.quit = state.exit_requested;
    }

    fn should_quit(&self) -> bool {
        self.quit
    }
}
