use log::debug;

/// The kind of construct that a `{` opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    Module,
    Match,
    Clocked,
    Plain,
}

impl Frame {
    /// The text that replaces the closing `}` of this frame.
    pub fn close_token(&self) -> &'static str {
        match self {
            Frame::Module => "endmodule",
            Frame::Match => "endcase",
            Frame::Clocked | Frame::Plain => "end",
        }
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Frame::Module => "module",
            Frame::Match => "match",
            Frame::Clocked => "clocked",
            Frame::Plain => "plain",
        })
    }
}

/**
 Tracks which brace delimited constructs are open.

 A line which introduces a construct (a module header, a `match`, an `on`
 block) arms the kind of frame it wants, and the next `{` pushes a frame of
 that kind.  A `{` with nothing armed pushes a [`Frame::Plain`].
*/
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
    armed: Option<Frame>,
}

impl ContextStack {
    pub fn new() -> ContextStack {
        ContextStack {
            frames: vec![],
            armed: None,
        }
    }

    pub fn arm(&mut self, frame: Frame) {
        debug!("Arm {} frame", frame);
        self.armed = Some(frame);
    }

    pub fn armed(&self) -> Option<Frame> {
        self.armed
    }

    /// Opens a frame of whatever kind is armed and returns it.
    pub fn push(&mut self) -> Frame {
        let frame = self.armed.take().unwrap_or(Frame::Plain);
        self.frames.push(frame);
        debug!("Open {} frame at depth {}", frame, self.frames.len());
        frame
    }

    pub fn pop(&mut self) -> Option<Frame> {
        let frame = self.frames.pop();
        if let Some(frame) = frame {
            debug!("Close {} frame at depth {}", frame, self.frames.len() + 1);
        }
        frame
    }

    /// True when a module body is open.
    pub fn in_module(&self) -> bool {
        self.frames.contains(&Frame::Module)
    }

    pub fn innermost(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
