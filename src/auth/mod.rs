pub mod flow;

pub use flow::{
    begin_authorization, complete_authorization, disconnect, reject_callback, CallbackParams,
};
