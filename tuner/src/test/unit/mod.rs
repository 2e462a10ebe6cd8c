mod declaration;
