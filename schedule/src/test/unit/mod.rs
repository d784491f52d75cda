mod rule_set;
mod schedule;
