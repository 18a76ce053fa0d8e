mod reconnect;
mod session;
mod support;
