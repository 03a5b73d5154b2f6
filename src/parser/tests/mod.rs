mod successes;
