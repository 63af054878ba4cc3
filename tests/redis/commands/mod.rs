mod blpop;
mod incr;
mod lists;
mod ping_and_echo;
