//! Code and data breakpoints (§4.4).
//!
//! The CPU holds a non-owning handle to a `Debugger`: it notifies the
//! debugger of PC updates and memory stores, and the debugger decides
//! whether those notifications cross a breakpoint and are worth forwarding
//! to the embedder's handler. The embedder owns both the CPU and the
//! `Debugger` it attaches; there is no back-reference from `Debugger` to
//! `Cpu` (§9 "Cyclic ownership").

use std::collections::BTreeMap;

/// A code breakpoint: stop (or notify) when the CPU is about to execute the
/// instruction at `address`.
#[derive(Debug, Clone, Copy)]
pub struct Breakpoint {
    pub address: u16,
    pub disabled: bool,
    /// Marks a breakpoint installed to implement "step over" (e.g. on the
    /// instruction following a JSR) rather than one the user placed
    /// directly; REPLs use this to distinguish transient from persistent
    /// breakpoints when listing them.
    pub step_over: bool,
}

impl Breakpoint {
    pub fn new(address: u16) -> Breakpoint {
        Breakpoint {
            address,
            disabled: false,
            step_over: false,
        }
    }
}

/// A data breakpoint: stop (or notify) when the CPU stores to `address`,
/// optionally only when the stored byte equals `match_value`.
#[derive(Debug, Clone, Copy)]
pub struct DataBreakpoint {
    pub address: u16,
    pub disabled: bool,
    pub conditional: bool,
    pub match_value: u8,
}

impl DataBreakpoint {
    pub fn new(address: u16) -> DataBreakpoint {
        DataBreakpoint {
            address,
            disabled: false,
            conditional: false,
            match_value: 0,
        }
    }
}

/// Callbacks the `Debugger` forwards to once a breakpoint fires.
pub trait DebugHandler {
    fn on_break(&mut self, address: u16);
    fn on_data_break(&mut self, address: u16, value: u8);
}

/// Owns the breakpoint tables and forwards hits to an attached
/// `DebugHandler`. `BTreeMap` keeps both tables sorted by address for free,
/// matching the "lists are returned address-sorted" requirement.
pub struct Debugger {
    breakpoints: BTreeMap<u16, Breakpoint>,
    data_breakpoints: BTreeMap<u16, DataBreakpoint>,
    handler: Option<Box<dyn DebugHandler>>,
}

impl Debugger {
    pub fn new() -> Debugger {
        Debugger {
            breakpoints: BTreeMap::new(),
            data_breakpoints: BTreeMap::new(),
            handler: None,
        }
    }

    pub fn attach_handler(&mut self, handler: Box<dyn DebugHandler>) {
        self.handler = Some(handler);
    }

    pub fn add_breakpoint(&mut self, bp: Breakpoint) {
        self.breakpoints.insert(bp.address, bp);
    }

    pub fn remove_breakpoint(&mut self, address: u16) -> Option<Breakpoint> {
        self.breakpoints.remove(&address)
    }

    pub fn add_data_breakpoint(&mut self, bp: DataBreakpoint) {
        self.data_breakpoints.insert(bp.address, bp);
    }

    pub fn remove_data_breakpoint(&mut self, address: u16) -> Option<DataBreakpoint> {
        self.data_breakpoints.remove(&address)
    }

    /// Breakpoints in ascending address order.
    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    /// Data breakpoints in ascending address order.
    pub fn data_breakpoints(&self) -> impl Iterator<Item = &DataBreakpoint> {
        self.data_breakpoints.values()
    }

    /// Called by the CPU whenever `PC` is about to execute the instruction
    /// at `addr`. Fires the handler iff a non-disabled breakpoint exists at
    /// `addr`.
    pub fn on_pc(&mut self, addr: u16) {
        let fire = matches!(self.breakpoints.get(&addr), Some(bp) if !bp.disabled);
        if fire {
            if let Some(handler) = &mut self.handler {
                handler.on_break(addr);
            }
        }
    }

    /// Called by the CPU after a store to `addr`. Fires the handler iff a
    /// non-disabled data breakpoint exists at `addr` and either it's
    /// unconditional or `value` matches its `match_value`.
    pub fn on_store(&mut self, addr: u16, value: u8) {
        let fire = matches!(
            self.data_breakpoints.get(&addr),
            Some(bp) if !bp.disabled && (!bp.conditional || bp.match_value == value)
        );
        if fire {
            if let Some(handler) = &mut self.handler {
                handler.on_data_break(addr, value);
            }
        }
    }
}

impl Default for Debugger {
    fn default() -> Debugger {
        Debugger::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingHandler {
        breaks: Rc<RefCell<Vec<u16>>>,
        data_breaks: Rc<RefCell<Vec<(u16, u8)>>>,
    }

    impl DebugHandler for RecordingHandler {
        fn on_break(&mut self, address: u16) {
            self.breaks.borrow_mut().push(address);
        }
        fn on_data_break(&mut self, address: u16, value: u8) {
            self.data_breaks.borrow_mut().push((address, value));
        }
    }

    #[test]
    fn fires_only_for_enabled_code_breakpoints() {
        let breaks = Rc::new(RefCell::new(Vec::new()));
        let mut dbg = Debugger::new();
        dbg.attach_handler(Box::new(RecordingHandler {
            breaks: breaks.clone(),
            data_breaks: Rc::new(RefCell::new(Vec::new())),
        }));

        dbg.add_breakpoint(Breakpoint::new(0x1000));
        let mut disabled = Breakpoint::new(0x2000);
        disabled.disabled = true;
        dbg.add_breakpoint(disabled);

        dbg.on_pc(0x1000);
        dbg.on_pc(0x2000);
        dbg.on_pc(0x3000);

        assert_eq!(*breaks.borrow(), vec![0x1000]);
    }

    #[test]
    fn conditional_data_breakpoint_requires_matching_value() {
        let data_breaks = Rc::new(RefCell::new(Vec::new()));
        let mut dbg = Debugger::new();
        dbg.attach_handler(Box::new(RecordingHandler {
            breaks: Rc::new(RefCell::new(Vec::new())),
            data_breaks: data_breaks.clone(),
        }));

        let mut bp = DataBreakpoint::new(0x20);
        bp.conditional = true;
        bp.match_value = 0x42;
        dbg.add_data_breakpoint(bp);

        dbg.on_store(0x20, 0x41);
        dbg.on_store(0x20, 0x42);

        assert_eq!(*data_breaks.borrow(), vec![(0x20, 0x42)]);
    }

    #[test]
    fn unconditional_data_breakpoint_fires_for_any_value() {
        let data_breaks = Rc::new(RefCell::new(Vec::new()));
        let mut dbg = Debugger::new();
        dbg.attach_handler(Box::new(RecordingHandler {
            breaks: Rc::new(RefCell::new(Vec::new())),
            data_breaks: data_breaks.clone(),
        }));
        dbg.add_data_breakpoint(DataBreakpoint::new(0x20));

        dbg.on_store(0x20, 0x99);

        assert_eq!(*data_breaks.borrow(), vec![(0x20, 0x99)]);
    }

    #[test]
    fn lists_are_address_sorted() {
        let mut dbg = Debugger::new();
        dbg.add_breakpoint(Breakpoint::new(0x3000));
        dbg.add_breakpoint(Breakpoint::new(0x1000));
        dbg.add_breakpoint(Breakpoint::new(0x2000));

        let addrs: Vec<u16> = dbg.breakpoints().map(|bp| bp.address).collect();
        assert_eq!(addrs, vec![0x1000, 0x2000, 0x3000]);
    }
}
