mod gating;
