mod graph_backward;
