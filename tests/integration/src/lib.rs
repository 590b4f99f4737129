// Licensed under the Apache-2.0 license

#[cfg(test)]
mod test_update_flow;
