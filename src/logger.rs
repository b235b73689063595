// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_record::LogRecord;
use std::fmt::Debug;

pub trait Logger: Debug + Send + Sync {
    /**
        Submits the log record for output.

        Implementations must not panic, and must not log back through the
        backend (a sink that logs its own failures would recurse).
    */
    fn finish_log_record(&self, record: &LogRecord);

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn prepare_to_die(&self);
}

/*
Boilerplate notes.

# Logger

I don't think Clone on Logger makes sense, so copy's out.
PartialEq and Eq are possible but it's a little unclear if we mean data equality or some kind of provenance-based thing.  Let's avoid that and not implement it.
Ord makes no sense.
Default is not necessarily sensible since who knows how the logger is constructed (does it need a filename to log to, etc.)
Display is not very sensible.
From/Into, no
AsRef,AsMut,Deref,DerefMut, no
Send/Sync is required: the router fans records out from arbitrary producer
threads and the dispatch workers.
*/
